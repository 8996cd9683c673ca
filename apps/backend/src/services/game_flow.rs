//! Game flow: starting games and routing in-game actions.

use tracing::info;

use crate::domain::game_transition::GameTransition;
use crate::domain::history::RecordedCommand;
use crate::domain::phase_machine::GameAction;
use crate::domain::roles::role_view;
use crate::logging::audit;
use crate::protocol::response::CommandResponse;
use crate::services::mutation::run_mutation;
use crate::state::app_state::AppState;
use crate::AppError;

#[derive(Default)]
pub struct GameFlowService;

impl GameFlowService {
    /// Host starts the game once the room is full. The seed is drawn here and
    /// recorded with the command.
    pub async fn start_game(
        &self,
        state: &AppState,
        room_id: &str,
        requester: &str,
    ) -> Result<CommandResponse, AppError> {
        let seed = state.seeds.next_seed()?;
        let outcome =
            run_mutation(state, room_id, requester, RecordedCommand::StartGame { seed }).await?;
        let game_no = outcome
            .snapshot
            .as_ref()
            .and_then(|s| s.game.as_ref())
            .map(|g| g.game_no);
        info!(room_id, ?game_no, "game started");
        Ok(outcome.into_response())
    }

    /// Host resets a finished room so the same members can play again.
    pub async fn new_game(
        &self,
        state: &AppState,
        room_id: &str,
        requester: &str,
    ) -> Result<CommandResponse, AppError> {
        let outcome = run_mutation(state, room_id, requester, RecordedCommand::NewGame).await?;
        Ok(outcome.into_response())
    }

    /// Propose, vote, act on a mission or guess Merlin.
    pub async fn act(
        &self,
        state: &AppState,
        room_id: &str,
        actor: &str,
        action: GameAction,
    ) -> Result<CommandResponse, AppError> {
        let command = match action {
            GameAction::ProposeTeam { team } => RecordedCommand::ProposeTeam { team },
            GameAction::CastVote { vote } => RecordedCommand::CastVote { vote },
            GameAction::SubmitMissionAction { action } => {
                RecordedCommand::SubmitMissionAction { action }
            }
            GameAction::AssassinateGuess { target } => RecordedCommand::AssassinateGuess { target },
            GameAction::RevealRole => return self.view_role(state, room_id, actor).await,
        };
        let outcome = run_mutation(state, room_id, actor, command).await?;
        if let Some(GameTransition::GameEnded { outcome: result }) = outcome
            .transitions
            .iter()
            .find(|t| matches!(t, GameTransition::GameEnded { .. }))
        {
            info!(room_id, winner = ?result.winner, reason = ?result.reason, "game over");
        }
        Ok(outcome.into_response())
    }

    /// The requester's own role. Sight of traitors is included on the first
    /// reveal only; every reveal is recorded.
    pub async fn view_role(
        &self,
        state: &AppState,
        room_id: &str,
        requester: &str,
    ) -> Result<CommandResponse, AppError> {
        let outcome =
            run_mutation(state, room_id, requester, RecordedCommand::RevealRole).await?;

        let first = outcome
            .transitions
            .iter()
            .find_map(|t| match t {
                GameTransition::RoleRevealed { first, .. } => Some(*first),
                _ => None,
            })
            .unwrap_or(false);
        let game = outcome
            .snapshot
            .as_ref()
            .and_then(|s| s.game.as_ref())
            .ok_or_else(|| {
                AppError::internal(format!("room {room_id} lost its game during role reveal"))
            })?;
        let role = role_view(game, requester, first)?;

        audit::role_revealed(room_id, requester, first);

        let mut response = outcome.into_response();
        response.role = Some(role);
        Ok(response)
    }
}
