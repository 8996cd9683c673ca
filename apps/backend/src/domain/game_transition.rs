// apps/backend/src/domain/game_transition.rs

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::state::{GameOutcome, MissionResult, Phase, UserId, Vote};

/// Observable effects of one accepted command, in the order they happened.
///
/// Transitions are public: nothing here may carry a role or a mission card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameTransition {
    RoomCreated {
        host_user_id: UserId,
        capacity: u8,
    },
    PlayerJoined {
        user_id: UserId,
        seat: usize,
    },
    /// The last open seat was taken.
    RoomFilled,
    PlayerLeft {
        user_id: UserId,
    },
    HostChanged {
        host_user_id: UserId,
    },
    /// Last member left before a game started.
    RoomAbandoned,

    GameStarted {
        game_no: u32,
        players: usize,
    },
    RoundStarted {
        round: u8,
        leader: UserId,
        team_size: usize,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
    },
    TeamProposed {
        leader: UserId,
        team: BTreeSet<UserId>,
    },
    /// Who voted, never how; the breakdown is published in `VoteTallied`.
    VoteCast {
        user_id: UserId,
    },
    VoteTallied {
        approvals: usize,
        rejections: usize,
        approved: bool,
        votes: BTreeMap<UserId, Vote>,
    },
    ProposalRejected {
        failed_proposals: u8,
    },
    LeaderChanged {
        leader: UserId,
    },
    /// Too many rejected proposals; the mission failed without being run.
    MissionAutoFailed {
        round: u8,
    },
    MissionActionSubmitted {
        user_id: UserId,
    },
    MissionCompleted {
        round: u8,
        result: MissionResult,
        fail_count: usize,
    },
    AssassinationAttempted {
        target: UserId,
    },
    GameEnded {
        outcome: GameOutcome,
    },
    /// A player looked at their role; `first` marks the one-time sight.
    RoleRevealed {
        user_id: UserId,
        first: bool,
    },
    /// Finished room reset to a full lobby.
    NewGameReady,
}

impl GameTransition {
    pub fn phase_changed(from: Phase, to: Phase) -> Self {
        GameTransition::PhaseChanged { from, to }
    }
}

/// Final phase named by a transition list, if any phase change happened.
pub fn last_phase(transitions: &[GameTransition]) -> Option<Phase> {
    transitions.iter().rev().find_map(|t| match t {
        GameTransition::PhaseChanged { to, .. } => Some(*to),
        _ => None,
    })
}
