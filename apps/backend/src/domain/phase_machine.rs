//! Avalon phase state machine.
//!
//! Rule checks run before any mutation; a rejected action leaves the state
//! untouched.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::game_transition::GameTransition;
use crate::domain::roles::assign_roles;
use crate::domain::rules::{GameRules, MISSIONS_TO_WIN};
use crate::domain::state::{
    require_leader, Alignment, GameOutcome, GameState, MissionAction, MissionResult, Phase,
    Role, UserId, VictoryReason, Vote, VoteRecord,
};
use crate::domain::tally::{tally_mission, tally_team_vote};
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

/// In-game player actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameAction {
    ProposeTeam { team: Vec<UserId> },
    CastVote { vote: Vote },
    SubmitMissionAction { action: MissionAction },
    AssassinateGuess { target: UserId },
    RevealRole,
}

impl GameAction {
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::ProposeTeam { .. } => "propose_team",
            GameAction::CastVote { .. } => "cast_vote",
            GameAction::SubmitMissionAction { .. } => "submit_mission_action",
            GameAction::AssassinateGuess { .. } => "assassinate_guess",
            GameAction::RevealRole => "view_role",
        }
    }
}

/// Deal roles and open round 1. The game keeps its own copy of `rules`.
pub fn start_game(
    room_id: &str,
    game_no: u32,
    seating: Vec<UserId>,
    rules: &GameRules,
    seed: u64,
) -> Result<(GameState, Vec<GameTransition>), DomainError> {
    let assignment = assign_roles(&seating, rules, seed)?;
    let players = seating.len();
    let team_size = required_team_size(rules, 1)?;

    let state = GameState {
        room_id: room_id.to_string(),
        game_no,
        seed,
        seating,
        phase: Phase::ProposingTeam,
        round_number: 1,
        leader_index: assignment.first_leader,
        current_team: BTreeSet::new(),
        votes: BTreeMap::new(),
        mission_actions: BTreeMap::new(),
        mission_results: Vec::new(),
        roles: assignment.roles,
        failed_proposals_this_round: 0,
        revealed: BTreeSet::new(),
        last_vote: None,
        outcome: None,
        rules: rules.clone(),
    };
    let leader = require_leader(&state, "start_game")?.clone();

    let transitions = vec![
        GameTransition::GameStarted { game_no, players },
        GameTransition::RoundStarted {
            round: 1,
            leader,
            team_size,
        },
    ];
    Ok((state, transitions))
}

/// Validate and apply one action by `actor`.
pub fn apply_action(
    state: &mut GameState,
    actor: &str,
    action: GameAction,
) -> Result<Vec<GameTransition>, DomainError> {
    if !state.is_seated(actor) {
        return Err(DomainError::validation(
            ValidationKind::PlayerNotInGame,
            "not seated in this game",
        ));
    }
    if state.is_over() {
        return Err(invalid_phase(state.phase, action.name()));
    }

    match action {
        GameAction::ProposeTeam { team } => propose_team(state, actor, team),
        GameAction::CastVote { vote } => cast_vote(state, actor, vote),
        GameAction::SubmitMissionAction { action } => submit_mission_action(state, actor, action),
        GameAction::AssassinateGuess { target } => assassinate(state, actor, target),
        GameAction::RevealRole => Ok(reveal_role(state, actor)),
    }
}

fn invalid_phase(phase: Phase, action: &str) -> DomainError {
    DomainError::validation(
        ValidationKind::InvalidPhase,
        format!("{action} is not allowed during {phase:?}"),
    )
}

fn require_phase(state: &GameState, expected: Phase, action: &str) -> Result<(), DomainError> {
    if state.phase == expected {
        Ok(())
    } else {
        Err(invalid_phase(state.phase, action))
    }
}

fn required_team_size(rules: &GameRules, round: u8) -> Result<usize, DomainError> {
    rules.team_size(round).ok_or_else(|| {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("no team size for round {round}"),
        )
    })
}

fn propose_team(
    state: &mut GameState,
    actor: &str,
    team: Vec<UserId>,
) -> Result<Vec<GameTransition>, DomainError> {
    require_phase(state, Phase::ProposingTeam, "propose_team")?;
    let leader = require_leader(state, "propose_team")?.clone();
    if leader != actor {
        return Err(DomainError::validation(
            ValidationKind::NotLeader,
            "only the current leader can propose a team",
        ));
    }

    let size = required_team_size(&state.rules, state.round_number)?;
    let picked: BTreeSet<UserId> = team.iter().cloned().collect();
    if picked.len() != team.len() {
        return Err(DomainError::validation(
            ValidationKind::InvalidTeam,
            "team lists a player more than once",
        ));
    }
    if picked.len() != size {
        return Err(DomainError::validation(
            ValidationKind::InvalidTeam,
            format!(
                "round {} needs a team of {size}, got {}",
                state.round_number,
                picked.len()
            ),
        ));
    }
    if let Some(stranger) = picked.iter().find(|u| !state.is_seated(u)) {
        return Err(DomainError::validation(
            ValidationKind::InvalidTeam,
            format!("{stranger} is not seated in this game"),
        ));
    }

    state.current_team = picked.clone();
    state.votes.clear();
    state.phase = Phase::Voting;

    Ok(vec![
        GameTransition::TeamProposed {
            leader,
            team: picked,
        },
        GameTransition::phase_changed(Phase::ProposingTeam, Phase::Voting),
    ])
}

fn cast_vote(
    state: &mut GameState,
    actor: &str,
    vote: Vote,
) -> Result<Vec<GameTransition>, DomainError> {
    require_phase(state, Phase::Voting, "cast_vote")?;

    state.votes.insert(actor.to_string(), vote);
    let mut transitions = vec![GameTransition::VoteCast {
        user_id: actor.to_string(),
    }];
    if state.votes.len() < state.player_count() {
        return Ok(transitions);
    }

    // Last ballot in: tally and move on within this same command.
    let tally = tally_team_vote(&state.votes, &state.seating);
    let votes = std::mem::take(&mut state.votes);
    state.last_vote = Some(VoteRecord {
        round: state.round_number,
        leader: require_leader(state, "cast_vote")?.clone(),
        team: state.current_team.clone(),
        votes: votes.clone(),
        approved: tally.approved,
    });
    transitions.push(GameTransition::VoteTallied {
        approvals: tally.approvals,
        rejections: tally.rejections,
        approved: tally.approved,
        votes,
    });

    if tally.approved {
        state.mission_actions.clear();
        state.phase = Phase::MissionExecution;
        transitions.push(GameTransition::phase_changed(
            Phase::Voting,
            Phase::MissionExecution,
        ));
        return Ok(transitions);
    }

    state.failed_proposals_this_round += 1;
    state.current_team.clear();
    transitions.push(GameTransition::phase_changed(
        Phase::Voting,
        Phase::ProposalRejected,
    ));
    transitions.push(GameTransition::ProposalRejected {
        failed_proposals: state.failed_proposals_this_round,
    });
    state.rotate_leader();
    transitions.push(GameTransition::LeaderChanged {
        leader: require_leader(state, "cast_vote")?.clone(),
    });

    if state.failed_proposals_this_round >= state.rules.max_failed_proposals {
        state.mission_results.push(MissionResult::Fail);
        transitions.push(GameTransition::MissionAutoFailed {
            round: state.round_number,
        });
        // The rejection already moved the leader on.
        end_round(state, Phase::ProposalRejected, false, &mut transitions)?;
    } else {
        state.phase = Phase::ProposingTeam;
        transitions.push(GameTransition::phase_changed(
            Phase::ProposalRejected,
            Phase::ProposingTeam,
        ));
    }
    Ok(transitions)
}

fn submit_mission_action(
    state: &mut GameState,
    actor: &str,
    action: MissionAction,
) -> Result<Vec<GameTransition>, DomainError> {
    require_phase(state, Phase::MissionExecution, "submit_mission_action")?;
    if !state.current_team.contains(actor) {
        return Err(DomainError::validation(
            ValidationKind::NotOnTeam,
            "only team members act on the mission",
        ));
    }
    if state.mission_actions.contains_key(actor) {
        return Err(DomainError::validation(
            ValidationKind::AlreadySubmitted,
            "mission action already submitted",
        ));
    }
    if state.rules.loyal_must_pass
        && action == MissionAction::Fail
        && state.alignment_of(actor) == Some(Alignment::Loyal)
    {
        return Err(DomainError::validation(
            ValidationKind::LoyalMustPass,
            "loyal players can only pass missions",
        ));
    }

    state.mission_actions.insert(actor.to_string(), action);
    let mut transitions = vec![GameTransition::MissionActionSubmitted {
        user_id: actor.to_string(),
    }];
    if state.mission_actions.len() < state.current_team.len() {
        return Ok(transitions);
    }

    let tally = tally_mission(&state.mission_actions, state.round_number, &state.rules)?;
    state.mission_results.push(tally.result);
    state.mission_actions.clear();
    transitions.push(GameTransition::MissionCompleted {
        round: state.round_number,
        result: tally.result,
        fail_count: tally.fail_count,
    });
    end_round(state, Phase::MissionExecution, true, &mut transitions)?;
    Ok(transitions)
}

/// Resolve a finished round: decide the game or open the next round.
fn end_round(
    state: &mut GameState,
    from: Phase,
    rotate: bool,
    transitions: &mut Vec<GameTransition>,
) -> Result<(), DomainError> {
    transitions.push(GameTransition::phase_changed(from, Phase::RoundEnd));
    state.current_team.clear();
    state.votes.clear();

    if state.fails() >= MISSIONS_TO_WIN {
        finish(
            state,
            GameOutcome {
                winner: Alignment::Traitor,
                reason: VictoryReason::MissionsFailed,
                assassin_target: None,
            },
            Phase::RoundEnd,
            transitions,
        );
        return Ok(());
    }
    if state.passes() >= MISSIONS_TO_WIN {
        state.phase = Phase::Assassination;
        transitions.push(GameTransition::phase_changed(
            Phase::RoundEnd,
            Phase::Assassination,
        ));
        return Ok(());
    }

    state.round_number += 1;
    state.failed_proposals_this_round = 0;
    if rotate {
        state.rotate_leader();
        transitions.push(GameTransition::LeaderChanged {
            leader: require_leader(state, "end_round")?.clone(),
        });
    }
    let team_size = required_team_size(&state.rules, state.round_number)?;
    state.phase = Phase::ProposingTeam;
    transitions.push(GameTransition::phase_changed(
        Phase::RoundEnd,
        Phase::ProposingTeam,
    ));
    transitions.push(GameTransition::RoundStarted {
        round: state.round_number,
        leader: require_leader(state, "end_round")?.clone(),
        team_size,
    });
    Ok(())
}

fn finish(
    state: &mut GameState,
    outcome: GameOutcome,
    from: Phase,
    transitions: &mut Vec<GameTransition>,
) {
    state.phase = Phase::GameOver;
    state.outcome = Some(outcome.clone());
    transitions.push(GameTransition::phase_changed(from, Phase::GameOver));
    transitions.push(GameTransition::GameEnded { outcome });
}

fn assassinate(
    state: &mut GameState,
    actor: &str,
    target: UserId,
) -> Result<Vec<GameTransition>, DomainError> {
    require_phase(state, Phase::Assassination, "assassinate_guess")?;
    if state.role_of(actor) != Some(Role::Assassin) {
        return Err(DomainError::validation(
            ValidationKind::NotAssassin,
            "only the assassin can name Merlin",
        ));
    }
    if target == actor || !state.is_seated(&target) {
        return Err(DomainError::validation(
            ValidationKind::InvalidTarget,
            "target must be another seated player",
        ));
    }

    let hit = state.role_of(&target) == Some(Role::Merlin);
    let outcome = if hit {
        GameOutcome {
            winner: Alignment::Traitor,
            reason: VictoryReason::MerlinAssassinated,
            assassin_target: Some(target.clone()),
        }
    } else {
        GameOutcome {
            winner: Alignment::Loyal,
            reason: VictoryReason::AssassinMissed,
            assassin_target: Some(target.clone()),
        }
    };

    let mut transitions = vec![GameTransition::AssassinationAttempted { target }];
    finish(state, outcome, Phase::Assassination, &mut transitions);
    Ok(transitions)
}

fn reveal_role(state: &mut GameState, actor: &str) -> Vec<GameTransition> {
    let first = state.revealed.insert(actor.to_string());
    vec![GameTransition::RoleRevealed {
        user_id: actor.to_string(),
        first,
    }]
}
