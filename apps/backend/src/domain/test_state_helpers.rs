//! Shared helpers for driving a game through the phase machine in tests.

use crate::domain::game_transition::GameTransition;
use crate::domain::phase_machine::{apply_action, start_game, GameAction};
use crate::domain::rules::RuleSet;
use crate::domain::state::{Alignment, GameState, MissionAction, Phase, Role, UserId, Vote};

pub fn seating(n: usize) -> Vec<UserId> {
    (0..n).map(|i| format!("p{i}")).collect()
}

pub fn started(n: usize, seed: u64) -> GameState {
    let rules = RuleSet::standard().game_rules(n as u8).unwrap();
    let (state, _) = start_game("room-1", 1, seating(n), &rules, seed).unwrap();
    state
}

pub fn leader(state: &GameState) -> UserId {
    state.leader().cloned().unwrap()
}

pub fn act(state: &mut GameState, actor: &str, action: GameAction) -> Vec<GameTransition> {
    apply_action(state, actor, action).unwrap()
}

fn by_alignment(state: &GameState, alignment: Alignment) -> Vec<UserId> {
    state
        .seating
        .iter()
        .filter(|u| state.alignment_of(u) == Some(alignment))
        .cloned()
        .collect()
}

/// A legal team for the current round holding exactly `traitors` traitors.
pub fn team_with_traitors(state: &GameState, traitors: usize) -> Vec<UserId> {
    let size = state.rules.team_size(state.round_number).unwrap();
    let mut team: Vec<UserId> = by_alignment(state, Alignment::Traitor)
        .into_iter()
        .take(traitors)
        .collect();
    team.extend(
        by_alignment(state, Alignment::Loyal)
            .into_iter()
            .take(size - team.len()),
    );
    assert_eq!(team.len(), size, "not enough players for requested team");
    team
}

pub fn propose(state: &mut GameState, team: Vec<UserId>) -> Vec<GameTransition> {
    let leader = leader(state);
    act(state, &leader, GameAction::ProposeTeam { team })
}

/// Every seated player votes; the first `approvals` in seating order approve.
pub fn vote_all(state: &mut GameState, approvals: usize) -> Vec<GameTransition> {
    let voters = state.seating.clone();
    let mut out = Vec::new();
    for (i, voter) in voters.iter().enumerate() {
        let vote = if i < approvals {
            Vote::Approve
        } else {
            Vote::Reject
        };
        out.extend(act(state, voter, GameAction::CastVote { vote }));
    }
    out
}

/// Propose a team and have everyone reject it.
pub fn reject_proposal(state: &mut GameState) -> Vec<GameTransition> {
    let team = team_with_traitors(state, 0);
    let mut out = propose(state, team);
    out.extend(vote_all(state, 0));
    out
}

/// Run a full round to a mission result; traitors on the team play Fail
/// when `fail` is set.
pub fn play_mission(state: &mut GameState, fail: bool) -> Vec<GameTransition> {
    let team = team_with_traitors(state, usize::from(fail));
    let everyone = state.player_count();
    let mut out = propose(state, team.clone());
    out.extend(vote_all(state, everyone));
    assert_eq!(state.phase, Phase::MissionExecution);
    for member in &team {
        let action = if fail && state.alignment_of(member) == Some(Alignment::Traitor) {
            MissionAction::Fail
        } else {
            MissionAction::Pass
        };
        out.extend(act(state, member, GameAction::SubmitMissionAction { action }));
    }
    out
}

pub fn assassin(state: &GameState) -> UserId {
    state
        .holders_of(Role::Assassin)
        .first()
        .map(|u| (*u).clone())
        .unwrap()
}

pub fn merlin(state: &GameState) -> UserId {
    state
        .holders_of(Role::Merlin)
        .first()
        .map(|u| (*u).clone())
        .unwrap()
}
