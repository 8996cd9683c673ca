//! Error codes for the Avalon room engine.
//!
//! This module defines all error codes surfaced to the ingress layer.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in command responses.

use core::fmt;

use serde::Serialize;

/// Coarse grouping of error codes, used by the dispatcher to decide what
/// is reported verbatim and what is collapsed into a generic failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed command or params; rejected before touching state
    Validation,
    /// Business-rule violation; caller-caused, never retried
    Domain,
    /// Storage/cache/environment failure; nothing committed, retry-safe
    Infrastructure,
}

/// Centralized error codes.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string that appears
/// in responses rendered back to the messaging channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request Validation
    /// Malformed or missing command parameters
    ParamValidation,
    /// Unknown command
    InvalidCommand,
    /// General validation error
    ValidationError,

    // Game Rules
    /// Action not allowed in the current phase
    InvalidPhase,
    /// Only the leader (or the host, for room management) may do this
    NotLeader,
    /// Only the assassin may guess
    NotAssassin,
    /// Only team members act on a mission
    NotOnTeam,
    /// User is not seated in the room
    PlayerNotInGame,
    /// Proposed team is invalid for this round
    InvalidTeam,
    /// Assassination target is invalid
    InvalidTarget,
    /// Mission action already submitted
    AlreadySubmitted,
    /// Loyal players may only pass missions
    LoyalMustPass,

    // Resource Not Found
    /// Room not found
    RoomNotFound,
    /// Game state missing for an in-game room
    GameStateNotFound,
    /// General not found error
    NotFound,

    // Room Conflicts
    /// Room is at capacity
    RoomFull,
    /// User already seated in the room
    AlreadyMember,
    /// Room status does not allow the operation
    RoomState,
    /// Room id already taken
    RoomExists,
    /// History sequence conflict
    HistoryConflict,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Database error
    DbError,
    /// Database timeout
    DbTimeout,
    /// Cache error
    CacheError,
    /// Data corruption detected
    DataCorruption,
    /// Configuration error
    ConfigError,
    /// Internal error
    Internal,
    /// Generic retryable failure shown to players
    TryAgain,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Request Validation
            Self::ParamValidation => "PARAM_VALIDATION",
            Self::InvalidCommand => "INVALID_COMMAND",
            Self::ValidationError => "VALIDATION_ERROR",

            // Game Rules
            Self::InvalidPhase => "INVALID_PHASE",
            Self::NotLeader => "NOT_LEADER",
            Self::NotAssassin => "NOT_ASSASSIN",
            Self::NotOnTeam => "NOT_ON_TEAM",
            Self::PlayerNotInGame => "PLAYER_NOT_IN_GAME",
            Self::InvalidTeam => "INVALID_TEAM",
            Self::InvalidTarget => "INVALID_TARGET",
            Self::AlreadySubmitted => "ALREADY_SUBMITTED",
            Self::LoyalMustPass => "LOYAL_MUST_PASS",

            // Resource Not Found
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::GameStateNotFound => "GAME_STATE_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            // Room Conflicts
            Self::RoomFull => "ROOM_FULL",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::RoomState => "ROOM_STATE",
            Self::RoomExists => "ROOM_EXISTS",
            Self::HistoryConflict => "HISTORY_CONFLICT",
            Self::Conflict => "CONFLICT",

            // System Errors
            Self::DbError => "DB_ERROR",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::CacheError => "CACHE_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
            Self::TryAgain => "TRY_AGAIN",
        }
    }

    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ParamValidation | Self::InvalidCommand | Self::ValidationError => {
                ErrorCategory::Validation
            }
            Self::InvalidPhase
            | Self::NotLeader
            | Self::NotAssassin
            | Self::NotOnTeam
            | Self::PlayerNotInGame
            | Self::InvalidTeam
            | Self::InvalidTarget
            | Self::AlreadySubmitted
            | Self::LoyalMustPass
            | Self::RoomNotFound
            | Self::NotFound
            | Self::RoomFull
            | Self::AlreadyMember
            | Self::RoomState
            | Self::RoomExists
            | Self::Conflict => ErrorCategory::Domain,
            Self::GameStateNotFound
            | Self::HistoryConflict
            | Self::DbError
            | Self::DbTimeout
            | Self::CacheError
            | Self::DataCorruption
            | Self::ConfigError
            | Self::Internal
            | Self::TryAgain => ErrorCategory::Infrastructure,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
