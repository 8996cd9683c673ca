//! Seeded role assignment and per-player role views.
//!
//! The seed is drawn once when a game starts and stored with the game, so
//! the same seating and seed always produce the same roles and first leader.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

use crate::domain::rules::GameRules;
use crate::domain::state::{Alignment, GameState, Role, UserId};
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    pub roles: BTreeMap<UserId, Role>,
    /// Seat index of the first leader.
    pub first_leader: usize,
}

/// Role multiset for a table: one Merlin plus servants, one Assassin plus minions.
pub fn role_deck(rules: &GameRules) -> Result<Vec<Role>, DomainError> {
    let players = rules.players();
    let traitors = rules.traitors();
    if traitors == 0 || traitors + 2 > players {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("rule row has {traitors} traitors for {players} players"),
        ));
    }
    let loyal = players - traitors;

    let mut deck = Vec::with_capacity(players);
    deck.push(Role::Merlin);
    deck.extend(std::iter::repeat_n(Role::LoyalServant, loyal - 1));
    deck.push(Role::Assassin);
    deck.extend(std::iter::repeat_n(Role::Minion, traitors - 1));
    Ok(deck)
}

/// Deal roles to `seating` and pick the first leader from the same stream.
pub fn assign_roles(
    seating: &[UserId],
    rules: &GameRules,
    seed: u64,
) -> Result<RoleAssignment, DomainError> {
    if seating.len() != rules.players() {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!(
                "{} seated at a table ruled for {}",
                seating.len(),
                rules.players()
            ),
        ));
    }
    let mut deck = role_deck(rules)?;
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
    let first_leader = rng.random_range(0..seating.len());

    let roles = seating.iter().cloned().zip(deck).collect();
    Ok(RoleAssignment {
        roles,
        first_leader,
    })
}

/// A player's own role, scoped to the requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleView {
    pub user_id: UserId,
    pub role: Role,
    pub alignment: Alignment,
    /// Traitors this player may see. Populated on the first reveal only.
    pub sees: Vec<UserId>,
    pub first_reveal: bool,
}

/// Build `user_id`'s role view. `first_reveal` controls whether sight is included.
pub fn role_view(
    state: &GameState,
    user_id: &str,
    first_reveal: bool,
) -> Result<RoleView, DomainError> {
    let role = state.role_of(user_id).ok_or_else(|| {
        DomainError::validation(ValidationKind::PlayerNotInGame, "no role in this game")
    })?;

    let sees = if first_reveal {
        sight(state, user_id, role)
    } else {
        Vec::new()
    };

    Ok(RoleView {
        user_id: user_id.to_string(),
        role,
        alignment: role.alignment(),
        sees,
        first_reveal,
    })
}

fn sight(state: &GameState, user_id: &str, role: Role) -> Vec<UserId> {
    match role {
        Role::Merlin => state.traitors().into_iter().cloned().collect(),
        Role::Assassin | Role::Minion => state
            .traitors()
            .into_iter()
            .filter(|u| u.as_str() != user_id)
            .cloned()
            .collect(),
        Role::LoyalServant => Vec::new(),
    }
}
