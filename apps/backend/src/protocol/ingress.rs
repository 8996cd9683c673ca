//! Line-oriented ingress envelope used by the console binary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::response::{CommandResponse, ErrorResponse};

/// One inbound `(room_id, user_id, command, params)` tuple.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandRequest {
    /// Empty on `create_room` to have a room code allocated.
    #[serde(default)]
    pub room_id: String,
    pub user_id: String,
    pub command: String,
    #[serde(default)]
    pub params: Value,
}

/// One outbound line: either a response or an error, never both.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub ok: bool,
    pub room_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<CommandResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,
}

impl Reply {
    pub fn new(room_id: String, result: Result<CommandResponse, ErrorResponse>) -> Self {
        match result {
            Ok(response) => {
                // A freshly created room reports its allocated id.
                let room_id = response
                    .room
                    .as_ref()
                    .map(|r| r.room_id.clone())
                    .unwrap_or(room_id);
                Self {
                    ok: true,
                    room_id,
                    response: Some(response),
                    error: None,
                }
            }
            Err(error) => Self {
                ok: false,
                room_id,
                response: None,
                error: Some(error),
            },
        }
    }
}
