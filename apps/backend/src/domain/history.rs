//! Append-only command history and deterministic replay.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::phase_machine::GameAction;
use crate::domain::room::RoomStatus;
use crate::domain::rules::{GameRules, RuleSet};
use crate::domain::snapshot::{apply_command, RoomSnapshot};
use crate::domain::state::{MissionAction, Phase, RoomId, UserId, Vote};
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};

/// An accepted command with everything needed to re-apply it.
///
/// Randomness and configuration are resolved before recording: `CreateRoom`
/// carries the rule row the room was opened under and `StartGame` the seed
/// it was started with, so replay never draws or looks anything up again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RecordedCommand {
    CreateRoom { rules: GameRules },
    JoinRoom,
    LeaveRoom,
    StartGame { seed: u64 },
    NewGame,
    ProposeTeam { team: Vec<UserId> },
    CastVote { vote: Vote },
    SubmitMissionAction { action: MissionAction },
    AssassinateGuess { target: UserId },
    RevealRole,
}

impl RecordedCommand {
    /// `CreateRoom` for `capacity` seats under the current rule table.
    pub fn create_room(capacity: u8, rules: &RuleSet) -> Result<Self, DomainError> {
        Ok(RecordedCommand::CreateRoom {
            rules: rules.game_rules(capacity)?,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            RecordedCommand::CreateRoom { .. } => "create_room",
            RecordedCommand::JoinRoom => "join_room",
            RecordedCommand::LeaveRoom => "leave_room",
            RecordedCommand::StartGame { .. } => "start_game",
            RecordedCommand::NewGame => "new_game",
            RecordedCommand::ProposeTeam { .. } => "propose_team",
            RecordedCommand::CastVote { .. } => "cast_vote",
            RecordedCommand::SubmitMissionAction { .. } => "submit_mission_action",
            RecordedCommand::AssassinateGuess { .. } => "assassinate_guess",
            RecordedCommand::RevealRole => "view_role",
        }
    }

    /// The in-game action this command maps to, if it is one.
    pub fn game_action(&self) -> Option<GameAction> {
        match self {
            RecordedCommand::ProposeTeam { team } => Some(GameAction::ProposeTeam {
                team: team.clone(),
            }),
            RecordedCommand::CastVote { vote } => Some(GameAction::CastVote { vote: *vote }),
            RecordedCommand::SubmitMissionAction { action } => {
                Some(GameAction::SubmitMissionAction { action: *action })
            }
            RecordedCommand::AssassinateGuess { target } => Some(GameAction::AssassinateGuess {
                target: target.clone(),
            }),
            RecordedCommand::RevealRole => Some(GameAction::RevealRole),
            RecordedCommand::CreateRoom { .. }
            | RecordedCommand::JoinRoom
            | RecordedCommand::LeaveRoom
            | RecordedCommand::StartGame { .. }
            | RecordedCommand::NewGame => None,
        }
    }
}

/// One history row. Never mutated after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    /// Strictly increasing per room, starting at 1.
    pub sequence_no: u64,
    pub room_id: RoomId,
    pub actor_user_id: UserId,
    pub command: RecordedCommand,
    /// Game phase after the command, when a game exists.
    pub resulting_phase: Option<Phase>,
    /// Room status after the command; `None` once the room was abandoned.
    pub room_status: Option<RoomStatus>,
    pub timestamp: OffsetDateTime,
}

/// Rebuild the room from its full history.
///
/// Returns `None` when the history ends with the room abandoned.
pub fn replay(events: &[HistoryEvent]) -> Result<Option<RoomSnapshot>, DomainError> {
    let mut current: Option<RoomSnapshot> = None;
    for (i, event) in events.iter().enumerate() {
        let expected = i as u64 + 1;
        if event.sequence_no != expected {
            return Err(DomainError::conflict(
                ConflictKind::HistorySequence,
                format!(
                    "history gap in room {}: expected sequence {expected}, found {}",
                    event.room_id, event.sequence_no
                ),
            ));
        }
        let applied = apply_command(
            &event.room_id,
            current.as_ref(),
            &event.actor_user_id,
            &event.command,
        )
        .map_err(|e| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!(
                    "history event {} ({}) no longer applies: {e}",
                    event.sequence_no,
                    event.command.name()
                ),
            )
        })?;
        current = applied.snapshot;
    }
    Ok(current)
}
