use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::{ErrorCategory, ErrorCode};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Rule violation: {detail}")]
    Rule { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Database error: {detail}")]
    Db { code: ErrorCode, detail: String },
    #[error("Cache error: {detail}")]
    Cache { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// Error code for any variant
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::Rule { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::Db { code, .. } => *code,
            AppError::Cache { .. } => ErrorCode::CacheError,
            AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Human-readable detail for any variant
    pub fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. } => detail.clone(),
            AppError::Rule { detail, .. } => detail.clone(),
            AppError::NotFound { detail, .. } => detail.clone(),
            AppError::Conflict { detail, .. } => detail.clone(),
            AppError::Db { detail, .. } => detail.clone(),
            AppError::Cache { detail } => detail.clone(),
            AppError::Internal { detail, .. } => detail.clone(),
            AppError::Config { detail } => detail.clone(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Transient infrastructure failures leave nothing committed, so the whole
    /// command can be submitted again. Internal faults are not retryable.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Infrastructure
            && !matches!(
                self.code(),
                ErrorCode::Internal | ErrorCode::DataCorruption | ErrorCode::ConfigError
            )
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn rule(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Rule {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn db(detail: impl Into<String>) -> Self {
        Self::Db {
            code: ErrorCode::DbError,
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            code: ErrorCode::Internal,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }
}

fn validation_code(kind: &ValidationKind) -> ErrorCode {
    match kind {
        ValidationKind::ParamValidation => ErrorCode::ParamValidation,
        ValidationKind::InvalidCommand => ErrorCode::InvalidCommand,
        ValidationKind::InvalidPhase => ErrorCode::InvalidPhase,
        // Host-only room management shares the leader gate's code.
        ValidationKind::NotLeader | ValidationKind::NotHost => ErrorCode::NotLeader,
        ValidationKind::NotAssassin => ErrorCode::NotAssassin,
        ValidationKind::NotOnTeam => ErrorCode::NotOnTeam,
        ValidationKind::PlayerNotInGame => ErrorCode::PlayerNotInGame,
        ValidationKind::InvalidTeam => ErrorCode::InvalidTeam,
        ValidationKind::InvalidTarget => ErrorCode::InvalidTarget,
        ValidationKind::AlreadySubmitted => ErrorCode::AlreadySubmitted,
        ValidationKind::LoyalMustPass => ErrorCode::LoyalMustPass,
        ValidationKind::Other(_) => ErrorCode::ValidationError,
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(kind, detail) => {
                let code = validation_code(&kind);
                match code.category() {
                    ErrorCategory::Validation => AppError::Validation { code, detail },
                    _ => AppError::Rule { code, detail },
                }
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::RoomFull => ErrorCode::RoomFull,
                    ConflictKind::AlreadyMember => ErrorCode::AlreadyMember,
                    ConflictKind::RoomState => ErrorCode::RoomState,
                    ConflictKind::RoomExists => ErrorCode::RoomExists,
                    ConflictKind::HistorySequence => ErrorCode::HistoryConflict,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::Conflict { code, detail }
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Room => ErrorCode::RoomNotFound,
                    NotFoundKind::GameState => ErrorCode::GameStateNotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::NotFound { code, detail }
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::Timeout => AppError::Db {
                    code: ErrorCode::DbTimeout,
                    detail,
                },
                InfraErrorKind::Database | InfraErrorKind::Other(_) => AppError::Db {
                    code: ErrorCode::DbError,
                    detail,
                },
                InfraErrorKind::CacheUnavailable => AppError::Cache { detail },
                InfraErrorKind::DataCorruption => AppError::Internal {
                    code: ErrorCode::DataCorruption,
                    detail,
                },
            },
        }
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::internal(format!("serialization error: {e}"))
    }
}
