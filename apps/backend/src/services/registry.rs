//! Room registry: creating, joining, leaving and inspecting rooms.

use tracing::{debug, info};

use crate::domain::history::RecordedCommand;
use crate::domain::player_view::public_view;
use crate::errors::ErrorCode;
use crate::protocol::response::CommandResponse;
use crate::services::mutation::{load_current, run_mutation};
use crate::state::app_state::AppState;
use crate::utils::room_code::generate_room_code;
use crate::AppError;

/// Attempts at drawing an unused room code before giving up.
const ROOM_CODE_ATTEMPTS: usize = 8;

#[derive(Default)]
pub struct RoomRegistry;

impl RoomRegistry {
    /// Create a room hosted by `host`, who takes seat 0.
    ///
    /// An empty `room_id` allocates a fresh room code. A supplied id that is
    /// already in use fails with `ROOM_EXISTS`.
    pub async fn create_room(
        &self,
        state: &AppState,
        room_id: &str,
        host: &str,
        capacity: u8,
    ) -> Result<CommandResponse, AppError> {
        let command = RecordedCommand::create_room(capacity, state.rules())?;
        if !room_id.is_empty() {
            let outcome = run_mutation(state, room_id, host, command).await?;
            info!(room_id, capacity, "room created");
            return Ok(outcome.into_response());
        }

        for attempt in 1..=ROOM_CODE_ATTEMPTS {
            let code = generate_room_code();
            match run_mutation(state, &code, host, command.clone()).await {
                Err(e) if e.code() == ErrorCode::RoomExists => {
                    debug!(attempt, "room code collision");
                }
                Err(e) => return Err(e),
                Ok(outcome) => {
                    info!(room_id = %code, capacity, "room created with allocated code");
                    return Ok(outcome.into_response());
                }
            }
        }
        Err(AppError::conflict(
            ErrorCode::RoomExists,
            "could not allocate an unused room code",
        ))
    }

    pub async fn join_room(
        &self,
        state: &AppState,
        room_id: &str,
        user_id: &str,
    ) -> Result<CommandResponse, AppError> {
        let outcome = run_mutation(state, room_id, user_id, RecordedCommand::JoinRoom).await?;
        Ok(outcome.into_response())
    }

    pub async fn leave_room(
        &self,
        state: &AppState,
        room_id: &str,
        user_id: &str,
    ) -> Result<CommandResponse, AppError> {
        let outcome = run_mutation(state, room_id, user_id, RecordedCommand::LeaveRoom).await?;
        if outcome.snapshot.is_none() {
            info!(room_id, "room abandoned");
        }
        Ok(outcome.into_response())
    }

    /// Public snapshot of the room and its game. Not recorded.
    pub async fn room_status(
        &self,
        state: &AppState,
        room_id: &str,
    ) -> Result<CommandResponse, AppError> {
        let snapshot = load_current(state, room_id).await?.ok_or_else(|| {
            AppError::not_found(ErrorCode::RoomNotFound, format!("room {room_id} does not exist"))
        })?;
        let (room, game) = public_view(&snapshot);
        Ok(CommandResponse {
            room: Some(room),
            game,
            ..CommandResponse::default()
        })
    }
}
