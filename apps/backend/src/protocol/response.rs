use serde::Serialize;

use crate::domain::game_transition::GameTransition;
use crate::domain::player_view::{GameView, RoomView};
use crate::domain::roles::RoleView;
use crate::errors::{ErrorCategory, ErrorCode};
use crate::AppError;

/// Successful command payload rendered back to the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct CommandResponse {
    /// `None` once the room has been abandoned.
    pub room: Option<RoomView>,
    pub game: Option<GameView>,
    pub transitions: Vec<GameTransition>,
    /// Requester's own role; only for `view_role`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleView>,
    /// History position of this command; `None` for read-only commands.
    pub sequence_no: Option<u64>,
}

const TRY_AGAIN_MESSAGE: &str = "Something went wrong on our side. Please try again.";
const INTERNAL_MESSAGE: &str = "Something went wrong on our side.";

/// Structured failure rendered back to the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub category: ErrorCategory,
    pub message: String,
    pub retryable: bool,
    pub trace_id: String,
}

impl ErrorResponse {
    /// Outward shape for `err`. Infrastructure detail never leaves the process.
    pub fn from_app_error(err: &AppError, trace_id: String) -> Self {
        let (code, message) = match err.category() {
            ErrorCategory::Infrastructure if err.is_retryable() => {
                (ErrorCode::TryAgain, TRY_AGAIN_MESSAGE.to_string())
            }
            ErrorCategory::Infrastructure => (ErrorCode::Internal, INTERNAL_MESSAGE.to_string()),
            ErrorCategory::Validation | ErrorCategory::Domain => (err.code(), err.detail()),
        };
        Self {
            code: code.as_str().to_string(),
            category: code.category(),
            message,
            retryable: err.is_retryable(),
            trace_id,
        }
    }
}
