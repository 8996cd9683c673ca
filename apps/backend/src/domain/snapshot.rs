//! Room snapshot: the unit the engine loads, mutates and persists.
//!
//! `apply_command` is the single entry point for both live commands and
//! replay, which is what keeps replayed state identical to live state.

use serde::{Deserialize, Serialize};

use crate::domain::game_transition::GameTransition;
use crate::domain::history::RecordedCommand;
use crate::domain::phase_machine::{apply_action, start_game};
use crate::domain::room::{Room, RoomStatus};
use crate::domain::rules::GameRules;
use crate::domain::state::{GameState, Phase};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room: Room,
    /// Present while InGame, and kept at GameOver until a new game resets it.
    pub game: Option<GameState>,
}

impl RoomSnapshot {
    pub fn room_id(&self) -> &str {
        &self.room.room_id
    }

    pub fn phase(&self) -> Option<Phase> {
        self.game.as_ref().map(|g| g.phase)
    }
}

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// `None` when the room was abandoned by this command.
    pub snapshot: Option<RoomSnapshot>,
    pub transitions: Vec<GameTransition>,
}

/// Apply `command` by `actor` to room `room_id`, whose current snapshot is
/// `current` (absent if the room does not exist).
///
/// Works on a copy; the caller's snapshot is never touched, so an error
/// leaves nothing half-applied.
pub fn apply_command(
    room_id: &str,
    current: Option<&RoomSnapshot>,
    actor: &str,
    command: &RecordedCommand,
) -> Result<Applied, DomainError> {
    let Some(current) = current else {
        return match command {
            RecordedCommand::CreateRoom { rules } => Ok(create_room(room_id, actor, rules)),
            _ => Err(DomainError::not_found(
                NotFoundKind::Room,
                format!("room {room_id} does not exist"),
            )),
        };
    };

    let mut next = current.clone();
    let mut transitions = Vec::new();

    match command {
        RecordedCommand::CreateRoom { .. } => {
            return Err(DomainError::conflict(
                ConflictKind::RoomExists,
                format!("room {} already exists", current.room_id()),
            ));
        }
        RecordedCommand::JoinRoom => {
            next.room.join(actor)?;
            transitions.push(GameTransition::PlayerJoined {
                user_id: actor.to_string(),
                seat: next.room.members.len() - 1,
            });
            if next.room.status == RoomStatus::Full {
                transitions.push(GameTransition::RoomFilled);
            }
        }
        RecordedCommand::LeaveRoom => {
            let outcome = next.room.leave(actor)?;
            transitions.push(GameTransition::PlayerLeft {
                user_id: actor.to_string(),
            });
            if let Some(host_user_id) = outcome.new_host {
                transitions.push(GameTransition::HostChanged { host_user_id });
            }
            if outcome.abandoned {
                transitions.push(GameTransition::RoomAbandoned);
                return Ok(Applied {
                    snapshot: None,
                    transitions,
                });
            }
        }
        RecordedCommand::StartGame { seed } => {
            next.room.begin_game(actor)?;
            let game_no = next.room.games_played + 1;
            let (game, started) = start_game(
                &next.room.room_id,
                game_no,
                next.room.members.clone(),
                &next.room.rules,
                *seed,
            )?;
            next.game = Some(game);
            transitions.extend(started);
        }
        RecordedCommand::NewGame => {
            next.room.reset_for_new_game(actor)?;
            next.game = None;
            transitions.push(GameTransition::NewGameReady);
        }
        other => {
            let action = other.game_action().ok_or_else(|| {
                DomainError::validation(ValidationKind::InvalidCommand, other.name())
            })?;
            let game = require_game(&mut next, actor)?;
            transitions.extend(apply_action(game, actor, action)?);
            if game.is_over() {
                next.room.finish();
            }
        }
    }

    Ok(Applied {
        snapshot: Some(next),
        transitions,
    })
}

fn create_room(room_id: &str, actor: &str, rules: &GameRules) -> Applied {
    let room = Room::create(room_id.to_string(), actor.to_string(), rules.clone());
    let transitions = vec![
        GameTransition::RoomCreated {
            host_user_id: actor.to_string(),
            capacity: room.capacity,
        },
        GameTransition::PlayerJoined {
            user_id: actor.to_string(),
            seat: 0,
        },
    ];
    Applied {
        snapshot: Some(RoomSnapshot { room, game: None }),
        transitions,
    }
}

fn require_game<'a>(
    snapshot: &'a mut RoomSnapshot,
    actor: &str,
) -> Result<&'a mut GameState, DomainError> {
    let status = snapshot.room.status;
    let is_member = snapshot.room.is_member(actor);
    match snapshot.game.as_mut() {
        Some(game) => Ok(game),
        None if status == RoomStatus::InGame => Err(DomainError::not_found(
            NotFoundKind::GameState,
            format!("room {} is in game but has no game state", snapshot.room.room_id),
        )),
        None if !is_member => Err(DomainError::validation(
            ValidationKind::PlayerNotInGame,
            "not seated in this room",
        )),
        None => Err(DomainError::validation(
            ValidationKind::InvalidPhase,
            "no game in progress",
        )),
    }
}
