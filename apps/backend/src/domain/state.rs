use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::rules::GameRules;
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Externally owned identity delivered by the messaging channel.
pub type UserId = String;
pub type RoomId = String;

/// Game progression phases.
///
/// `ProposalRejected` and `RoundEnd` are pass-through phases: the machine
/// moves through them inside a single command, so they show up in
/// transitions but never in a persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Leader picks a team of the size the rule table requires.
    ProposingTeam,
    /// Every seated player approves or rejects the proposed team.
    Voting,
    /// Team members secretly submit pass/fail.
    MissionExecution,
    ProposalRejected,
    RoundEnd,
    /// Loyal side won three missions; the Assassin gets one guess.
    Assassination,
    /// Terminal.
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Loyal,
    Traitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Loyal; sees every traitor once.
    Merlin,
    LoyalServant,
    /// Traitor; makes the final guess.
    Assassin,
    Minion,
}

impl Role {
    pub const fn alignment(self) -> Alignment {
        match self {
            Role::Merlin | Role::LoyalServant => Alignment::Loyal,
            Role::Assassin | Role::Minion => Alignment::Traitor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionAction {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionResult {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryReason {
    /// Three missions failed.
    MissionsFailed,
    /// Three missions passed and the Assassin missed Merlin.
    AssassinMissed,
    /// Three missions passed but the Assassin named Merlin.
    MerlinAssassinated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Alignment,
    pub reason: VictoryReason,
    /// Player named by the Assassin, when the game reached a guess.
    pub assassin_target: Option<UserId>,
}

/// The most recent tallied team vote; published in full once counted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub round: u8,
    pub leader: UserId,
    pub team: BTreeSet<UserId>,
    pub votes: BTreeMap<UserId, Vote>,
    pub approved: bool,
}

/// Live game for one room.
///
/// Ordered collections only: the state is hashed and compared across live
/// and replayed copies, so its serialized form must be deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub room_id: RoomId,
    /// 1-based count of games played in this room.
    pub game_no: u32,
    /// Seed the roles and first leader were drawn from.
    pub seed: u64,
    /// Seating order fixed at game start.
    pub seating: Vec<UserId>,
    pub phase: Phase,
    /// 1..=5
    pub round_number: u8,
    /// Index into `seating`.
    pub leader_index: usize,
    pub current_team: BTreeSet<UserId>,
    /// Votes on the current proposal; a re-vote overwrites.
    pub votes: BTreeMap<UserId, Vote>,
    pub mission_actions: BTreeMap<UserId, MissionAction>,
    pub mission_results: Vec<MissionResult>,
    pub roles: BTreeMap<UserId, Role>,
    pub failed_proposals_this_round: u8,
    /// Players who already received their one-time sight.
    pub revealed: BTreeSet<UserId>,
    pub last_vote: Option<VoteRecord>,
    pub outcome: Option<GameOutcome>,
    /// Copied from the room at start; team sizes and thresholds read from here.
    pub rules: GameRules,
}

impl GameState {
    pub fn player_count(&self) -> usize {
        self.seating.len()
    }

    pub fn is_seated(&self, user_id: &str) -> bool {
        self.seating.iter().any(|u| u == user_id)
    }

    pub fn leader(&self) -> Option<&UserId> {
        self.seating.get(self.leader_index)
    }

    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        self.roles.get(user_id).copied()
    }

    pub fn alignment_of(&self, user_id: &str) -> Option<Alignment> {
        self.role_of(user_id).map(Role::alignment)
    }

    /// Seated users holding `role`, in seating order.
    pub fn holders_of(&self, role: Role) -> Vec<&UserId> {
        self.seating
            .iter()
            .filter(|u| self.role_of(u) == Some(role))
            .collect()
    }

    /// Traitors in seating order.
    pub fn traitors(&self) -> Vec<&UserId> {
        self.seating
            .iter()
            .filter(|u| self.alignment_of(u) == Some(Alignment::Traitor))
            .collect()
    }

    pub fn passes(&self) -> usize {
        self.mission_results
            .iter()
            .filter(|r| **r == MissionResult::Pass)
            .count()
    }

    pub fn fails(&self) -> usize {
        self.mission_results
            .iter()
            .filter(|r| **r == MissionResult::Fail)
            .count()
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Advance the leader one seat, wrapping around the table.
    pub fn rotate_leader(&mut self) {
        let n = self.seating.len();
        if n > 0 {
            self.leader_index = next_seat(self.leader_index, n);
        }
    }
}

/// Seat after `index` at a table of `n`.
#[inline]
pub fn next_seat(index: usize, n: usize) -> usize {
    (index + 1) % n
}

pub fn require_leader<'a>(
    state: &'a GameState,
    ctx: &'static str,
) -> Result<&'a UserId, DomainError> {
    state.leader().ok_or_else(|| {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("leader index out of range ({ctx})"),
        )
    })
}
