//! Command dispatcher: the only place errors take their outward shape.

use serde_json::Value;
use tracing::{debug, error, info, info_span, Instrument};
use ulid::Ulid;

use crate::domain::phase_machine::GameAction;
use crate::errors::{ErrorCategory, ErrorCode};
use crate::logging::audit;
use crate::logging::pii::Redacted;
use crate::protocol::command::{validate_identifier, Command};
use crate::protocol::ingress::{CommandRequest, Reply};
use crate::protocol::response::{CommandResponse, ErrorResponse};
use crate::services::game_flow::GameFlowService;
use crate::services::registry::RoomRegistry;
use crate::state::app_state::AppState;
use crate::trace_ctx;
use crate::AppError;

pub struct CommandDispatcher {
    state: AppState,
    registry: RoomRegistry,
    game_flow: GameFlowService,
}

impl CommandDispatcher {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            registry: RoomRegistry,
            game_flow: GameFlowService,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Handle one inbound command.
    ///
    /// Each call gets its own trace id, carried by the `command` span and by
    /// any error returned.
    pub async fn handle(
        &self,
        room_id: &str,
        user_id: &str,
        command: &str,
        params: &Value,
    ) -> Result<CommandResponse, ErrorResponse> {
        let trace_id = Ulid::new().to_string();
        let span = info_span!(
            "command",
            %trace_id,
            room_id,
            command,
            user = %Redacted(user_id)
        );

        trace_ctx::with_trace_id(
            trace_id.clone(),
            async {
                match self.dispatch(room_id, user_id, command, params).await {
                    Ok(response) => {
                        debug!(sequence_no = ?response.sequence_no, "command handled");
                        Ok(response)
                    }
                    Err(err) => Err(self.render(&err, room_id, user_id, command, trace_id)),
                }
            }
            .instrument(span),
        )
        .await
    }

    /// Handle a decoded ingress line and wrap the result for the channel.
    pub async fn handle_request(&self, request: &CommandRequest) -> Reply {
        let result = self
            .handle(
                &request.room_id,
                &request.user_id,
                &request.command,
                &request.params,
            )
            .await;
        Reply::new(request.room_id.clone(), result)
    }

    async fn dispatch(
        &self,
        room_id: &str,
        user_id: &str,
        command: &str,
        params: &Value,
    ) -> Result<CommandResponse, AppError> {
        validate_identifier("user_id", user_id)?;
        let command = Command::parse(command, params)?;
        // create_room may leave the id empty to have a code allocated.
        if !(room_id.is_empty() && matches!(command, Command::CreateRoom { .. })) {
            validate_identifier("room_id", room_id)?;
        }
        debug!(
            command = command.name(),
            read_only = command.is_read_only(),
            "dispatching"
        );

        let state = &self.state;
        match command {
            Command::CreateRoom { capacity } => {
                self.registry
                    .create_room(state, room_id, user_id, capacity)
                    .await
            }
            Command::JoinRoom => self.registry.join_room(state, room_id, user_id).await,
            Command::LeaveRoom => self.registry.leave_room(state, room_id, user_id).await,
            Command::RoomStatus => self.registry.room_status(state, room_id).await,
            Command::StartGame => self.game_flow.start_game(state, room_id, user_id).await,
            Command::NewGame => self.game_flow.new_game(state, room_id, user_id).await,
            Command::ViewRole => self.game_flow.view_role(state, room_id, user_id).await,
            Command::ProposeTeam { team } => {
                self.game_flow
                    .act(state, room_id, user_id, GameAction::ProposeTeam { team })
                    .await
            }
            Command::CastVote { vote } => {
                self.game_flow
                    .act(state, room_id, user_id, GameAction::CastVote { vote })
                    .await
            }
            Command::SubmitMissionAction { action } => {
                self.game_flow
                    .act(
                        state,
                        room_id,
                        user_id,
                        GameAction::SubmitMissionAction { action },
                    )
                    .await
            }
            Command::AssassinateGuess { target } => {
                self.game_flow
                    .act(state, room_id, user_id, GameAction::AssassinateGuess { target })
                    .await
            }
        }
    }

    fn render(
        &self,
        err: &AppError,
        room_id: &str,
        user_id: &str,
        command: &str,
        trace_id: String,
    ) -> ErrorResponse {
        let code = err.code();
        match err.category() {
            ErrorCategory::Infrastructure => {
                error!(
                    code = code.as_str(),
                    retryable = err.is_retryable(),
                    detail = %err.detail(),
                    "command failed on infrastructure"
                );
            }
            ErrorCategory::Validation | ErrorCategory::Domain => {
                if is_authority_refusal(code) {
                    audit::unauthorized_action(room_id, user_id, command, code.as_str());
                } else {
                    info!(code = code.as_str(), "command rejected");
                }
            }
        }
        ErrorResponse::from_app_error(err, trace_id)
    }
}

fn is_authority_refusal(code: ErrorCode) -> bool {
    matches!(
        code,
        ErrorCode::NotLeader
            | ErrorCode::NotAssassin
            | ErrorCode::NotOnTeam
            | ErrorCode::PlayerNotInGame
    )
}
