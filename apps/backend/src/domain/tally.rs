//! Pure vote and mission scoring.

use std::collections::BTreeMap;

use crate::domain::rules::GameRules;
use crate::domain::state::{MissionAction, MissionResult, UserId, Vote};
use crate::errors::domain::{DomainError, InfraErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamVoteTally {
    pub approvals: usize,
    pub rejections: usize,
    pub approved: bool,
}

/// Strict majority approves; ties reject. Only ballots from `members` count.
pub fn tally_team_vote(votes: &BTreeMap<UserId, Vote>, members: &[UserId]) -> TeamVoteTally {
    let (approvals, rejections) = members
        .iter()
        .filter_map(|m| votes.get(m))
        .fold((0, 0), |(a, r), v| match v {
            Vote::Approve => (a + 1, r),
            Vote::Reject => (a, r + 1),
        });
    TeamVoteTally {
        approvals,
        rejections,
        approved: approvals > rejections,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionTally {
    pub fail_count: usize,
    pub threshold: usize,
    pub result: MissionResult,
}

/// A mission fails once the fail count reaches the round's threshold.
///
/// Only the count leaves this function; who played a fail is never exposed.
pub fn tally_mission(
    actions: &BTreeMap<UserId, MissionAction>,
    round_number: u8,
    rules: &GameRules,
) -> Result<MissionTally, DomainError> {
    let threshold = rules.fail_threshold(round_number).ok_or_else(|| {
        DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("no fail threshold for round {round_number}"),
        )
    })?;
    let fail_count = actions
        .values()
        .filter(|a| **a == MissionAction::Fail)
        .count();
    let result = if fail_count >= threshold {
        MissionResult::Fail
    } else {
        MissionResult::Pass
    };
    Ok(MissionTally {
        fail_count,
        threshold,
        result,
    })
}
