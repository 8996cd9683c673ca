//! Room membership and lifecycle.

use serde::{Deserialize, Serialize};

use crate::domain::rules::GameRules;
use crate::domain::state::{RoomId, UserId};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// Room lifecycle: `Open → Full → InGame → Finished`, and back to `Full`
/// only through an explicit new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Open,
    Full,
    InGame,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: RoomId,
    pub host_user_id: UserId,
    pub capacity: u8,
    /// Join order doubles as seating order.
    pub members: Vec<UserId>,
    pub status: RoomStatus,
    pub games_played: u32,
    /// Fixed at creation; every game in this room is played under it.
    pub rules: GameRules,
}

/// What a successful leave changed beyond the member list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeaveOutcome {
    pub new_host: Option<UserId>,
    /// The last member left; the room should be dropped.
    pub abandoned: bool,
}

impl Room {
    /// Open a room with the host in seat 0. Capacity is the rule row's
    /// player count.
    pub fn create(room_id: RoomId, host_user_id: UserId, rules: GameRules) -> Self {
        Self {
            room_id,
            members: vec![host_user_id.clone()],
            host_user_id,
            capacity: rules.table.players,
            status: RoomStatus::Open,
            games_played: 0,
            rules,
        }
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }

    pub fn is_host(&self, user_id: &str) -> bool {
        self.host_user_id == user_id
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity as usize
    }

    pub fn join(&mut self, user_id: &str) -> Result<(), DomainError> {
        match self.status {
            RoomStatus::InGame | RoomStatus::Finished => {
                return Err(DomainError::conflict(
                    ConflictKind::RoomState,
                    format!("room {} is no longer accepting players", self.room_id),
                ))
            }
            RoomStatus::Open | RoomStatus::Full => {}
        }
        if self.is_member(user_id) {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyMember,
                "already seated in this room",
            ));
        }
        if self.status == RoomStatus::Full || self.is_full() {
            return Err(DomainError::conflict(
                ConflictKind::RoomFull,
                format!("room {} is full ({} seats)", self.room_id, self.capacity),
            ));
        }
        self.members.push(user_id.to_string());
        if self.is_full() {
            self.status = RoomStatus::Full;
        }
        Ok(())
    }

    /// Leave an Open room. A departing host hands off to the next seat.
    pub fn leave(&mut self, user_id: &str) -> Result<LeaveOutcome, DomainError> {
        let Some(pos) = self.members.iter().position(|m| m == user_id) else {
            return Err(DomainError::validation(
                ValidationKind::PlayerNotInGame,
                "not seated in this room",
            ));
        };
        if self.status != RoomStatus::Open {
            return Err(DomainError::conflict(
                ConflictKind::RoomState,
                format!("cannot leave a room that is {:?}", self.status),
            ));
        }
        self.members.remove(pos);

        let mut outcome = LeaveOutcome::default();
        if self.members.is_empty() {
            outcome.abandoned = true;
        } else if self.host_user_id == user_id {
            self.host_user_id = self.members[0].clone();
            outcome.new_host = Some(self.host_user_id.clone());
        }
        Ok(outcome)
    }

    /// Host-only; requires every seat taken.
    pub fn begin_game(&mut self, requester: &str) -> Result<(), DomainError> {
        self.require_member(requester)?;
        if !self.is_host(requester) {
            return Err(DomainError::validation(
                ValidationKind::NotHost,
                "only the host can start the game",
            ));
        }
        if self.status != RoomStatus::Full {
            return Err(DomainError::conflict(
                ConflictKind::RoomState,
                format!(
                    "room must be full to start ({}/{} seated, {:?})",
                    self.members.len(),
                    self.capacity,
                    self.status
                ),
            ));
        }
        self.status = RoomStatus::InGame;
        Ok(())
    }

    pub fn finish(&mut self) {
        if self.status == RoomStatus::InGame {
            self.status = RoomStatus::Finished;
            self.games_played += 1;
        }
    }

    /// Host-only reset of a finished room for another game with the same table.
    pub fn reset_for_new_game(&mut self, requester: &str) -> Result<(), DomainError> {
        self.require_member(requester)?;
        if !self.is_host(requester) {
            return Err(DomainError::validation(
                ValidationKind::NotHost,
                "only the host can reset the room",
            ));
        }
        if self.status != RoomStatus::Finished {
            return Err(DomainError::conflict(
                ConflictKind::RoomState,
                format!("no finished game to reset ({:?})", self.status),
            ));
        }
        self.status = RoomStatus::Full;
        Ok(())
    }

    pub fn require_member(&self, user_id: &str) -> Result<(), DomainError> {
        if self.is_member(user_id) {
            Ok(())
        } else {
            Err(DomainError::validation(
                ValidationKind::PlayerNotInGame,
                "not seated in this room",
            ))
        }
    }
}
