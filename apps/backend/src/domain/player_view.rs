//! Public views of a room and its game.
//!
//! Everything here is safe to show the whole table: who voted but not how
//! (until the tally), who acted on the mission but not what they played,
//! and roles only once the game is over.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::room::{Room, RoomStatus};
use crate::domain::snapshot::RoomSnapshot;
use crate::domain::state::{
    GameOutcome, GameState, MissionResult, Phase, Role, RoomId, UserId, VoteRecord,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomView {
    pub room_id: RoomId,
    pub host_user_id: UserId,
    pub capacity: u8,
    pub members: Vec<UserId>,
    pub status: RoomStatus,
    pub games_played: u32,
}

impl From<&Room> for RoomView {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.room_id.clone(),
            host_user_id: room.host_user_id.clone(),
            capacity: room.capacity,
            members: room.members.clone(),
            status: room.status,
            games_played: room.games_played,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameView {
    pub game_no: u32,
    pub phase: Phase,
    pub round_number: u8,
    pub leader: Option<UserId>,
    pub current_team: BTreeSet<UserId>,
    /// Team size the leader must propose this round.
    pub required_team_size: Option<usize>,
    pub voted: BTreeSet<UserId>,
    pub mission_submitted: BTreeSet<UserId>,
    pub mission_results: Vec<MissionResult>,
    pub failed_proposals_this_round: u8,
    pub last_vote: Option<VoteRecord>,
    pub outcome: Option<GameOutcome>,
    /// Only populated at GameOver.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeMap<UserId, Role>>,
}

impl GameView {
    pub fn build(state: &GameState) -> Self {
        let roles = state.is_over().then(|| state.roles.clone());
        Self {
            game_no: state.game_no,
            phase: state.phase,
            round_number: state.round_number,
            leader: state.leader().cloned(),
            current_team: state.current_team.clone(),
            required_team_size: state.rules.team_size(state.round_number),
            voted: state.votes.keys().cloned().collect(),
            mission_submitted: state.mission_actions.keys().cloned().collect(),
            mission_results: state.mission_results.clone(),
            failed_proposals_this_round: state.failed_proposals_this_round,
            last_vote: state.last_vote.clone(),
            outcome: state.outcome.clone(),
            roles,
        }
    }
}

/// Room plus game, as shown by `room_status`.
pub fn public_view(snapshot: &RoomSnapshot) -> (RoomView, Option<GameView>) {
    (
        RoomView::from(&snapshot.room),
        snapshot.game.as_ref().map(GameView::build),
    )
}
