//! Capacity-indexed rule table.
//!
//! Team sizes, fail thresholds and role composition are configuration: the
//! published ruleset is the default, and hosts may load an override from JSON.

use serde::{Deserialize, Serialize};

use crate::errors::domain::{ConflictKind, DomainError};

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 10;
pub const ROUNDS: usize = 5;
/// Missions a side must win to decide the game.
pub const MISSIONS_TO_WIN: usize = 3;

/// Rules for one player count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerCountRules {
    pub players: u8,
    /// Traitor count, including the Assassin.
    pub traitors: u8,
    pub team_sizes: [u8; ROUNDS],
    pub fail_thresholds: [u8; ROUNDS],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSet {
    pub tables: Vec<PlayerCountRules>,
    #[serde(default = "default_max_failed_proposals")]
    pub max_failed_proposals: u8,
    #[serde(default = "default_loyal_must_pass")]
    pub loyal_must_pass: bool,
}

/// The rules one room plays under, resolved from the table when the room
/// is created and carried with it from then on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameRules {
    pub table: PlayerCountRules,
    pub max_failed_proposals: u8,
    pub loyal_must_pass: bool,
}

impl GameRules {
    pub fn players(&self) -> usize {
        self.table.players as usize
    }

    pub fn traitors(&self) -> usize {
        self.table.traitors as usize
    }

    pub fn team_size(&self, round: u8) -> Option<usize> {
        let idx = round_index(round)?;
        Some(self.table.team_sizes[idx] as usize)
    }

    pub fn fail_threshold(&self, round: u8) -> Option<usize> {
        let idx = round_index(round)?;
        Some(self.table.fail_thresholds[idx] as usize)
    }
}

fn default_max_failed_proposals() -> u8 {
    5
}

fn default_loyal_must_pass() -> bool {
    true
}

const fn row(players: u8, traitors: u8, team_sizes: [u8; 5]) -> PlayerCountRules {
    // Round 4 needs two fails once the table reaches seven players.
    let fail_thresholds = if players >= 7 {
        [1, 1, 1, 2, 1]
    } else {
        [1, 1, 1, 1, 1]
    };
    PlayerCountRules {
        players,
        traitors,
        team_sizes,
        fail_thresholds,
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    /// The published ruleset.
    pub fn standard() -> Self {
        Self {
            tables: vec![
                row(5, 2, [2, 3, 2, 3, 3]),
                row(6, 2, [2, 3, 4, 3, 4]),
                row(7, 3, [2, 3, 3, 4, 4]),
                row(8, 3, [3, 4, 4, 5, 5]),
                row(9, 3, [3, 4, 4, 5, 5]),
                row(10, 4, [3, 4, 4, 5, 5]),
            ],
            max_failed_proposals: default_max_failed_proposals(),
            loyal_must_pass: default_loyal_must_pass(),
        }
    }

    pub fn for_players(&self, players: usize) -> Option<&PlayerCountRules> {
        self.tables.iter().find(|t| t.players as usize == players)
    }

    pub fn supports(&self, players: usize) -> bool {
        self.for_players(players).is_some()
    }

    /// Rules for a room of `capacity` seats.
    pub fn game_rules(&self, capacity: u8) -> Result<GameRules, DomainError> {
        let table = self.for_players(capacity as usize).ok_or_else(|| {
            DomainError::conflict(
                ConflictKind::RoomState,
                format!("capacity {capacity} is not supported by the rule table"),
            )
        })?;
        Ok(GameRules {
            table: table.clone(),
            max_failed_proposals: self.max_failed_proposals,
            loyal_must_pass: self.loyal_must_pass,
        })
    }

    /// Required team size for `round` (1-based).
    pub fn team_size(&self, players: usize, round: u8) -> Option<usize> {
        let idx = round_index(round)?;
        self.for_players(players).map(|t| t.team_sizes[idx] as usize)
    }

    /// Minimum fail cards that sink the mission in `round` (1-based).
    pub fn fail_threshold(&self, players: usize, round: u8) -> Option<usize> {
        let idx = round_index(round)?;
        self.for_players(players).map(|t| t.fail_thresholds[idx] as usize)
    }

    pub fn traitor_count(&self, players: usize) -> Option<usize> {
        self.for_players(players).map(|t| t.traitors as usize)
    }

    /// Structural checks; a table that passes is safe for the phase machine.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.tables.is_empty() {
            return Err(DomainError::validation_other("rule table is empty"));
        }
        if self.max_failed_proposals == 0 {
            return Err(DomainError::validation_other(
                "max_failed_proposals must be at least 1",
            ));
        }
        let mut seen = Vec::with_capacity(self.tables.len());
        for t in &self.tables {
            let players = t.players as usize;
            if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&players) {
                return Err(DomainError::validation_other(format!(
                    "player count {players} outside {MIN_PLAYERS}..={MAX_PLAYERS}"
                )));
            }
            if seen.contains(&t.players) {
                return Err(DomainError::validation_other(format!(
                    "duplicate rules for {players} players"
                )));
            }
            seen.push(t.players);
            // One Assassin is required, and at least Merlin plus one more loyal.
            if t.traitors == 0 || (t.traitors as usize) + 2 > players {
                return Err(DomainError::validation_other(format!(
                    "invalid traitor count {} for {players} players",
                    t.traitors
                )));
            }
            for (i, (&size, &threshold)) in
                t.team_sizes.iter().zip(t.fail_thresholds.iter()).enumerate()
            {
                if size == 0 || size as usize > players {
                    return Err(DomainError::validation_other(format!(
                        "round {} team size {size} invalid for {players} players",
                        i + 1
                    )));
                }
                if threshold == 0 || threshold > size {
                    return Err(DomainError::validation_other(format!(
                        "round {} fail threshold {threshold} invalid for team size {size}",
                        i + 1
                    )));
                }
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON rule table.
    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let rules: RuleSet = serde_json::from_str(raw)
            .map_err(|e| DomainError::validation_other(format!("malformed rule table: {e}")))?;
        rules.validate()?;
        Ok(rules)
    }
}

fn round_index(round: u8) -> Option<usize> {
    let r = round as usize;
    (1..=ROUNDS).contains(&r).then(|| r - 1)
}
