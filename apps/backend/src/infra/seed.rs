//! Seed sources for game start.
//!
//! A seed is drawn once per game and recorded with the start command, so
//! nothing downstream ever draws randomness again.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::OsRng;
use rand::TryRngCore;

use crate::errors::domain::{DomainError, InfraErrorKind};

pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> Result<u64, DomainError>;
}

/// Operating-system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSeedSource;

impl SeedSource for OsSeedSource {
    fn next_seed(&self) -> Result<u64, DomainError> {
        OsRng.try_next_u64().map_err(|e| {
            DomainError::infra(
                InfraErrorKind::Other("OsRng".into()),
                format!("OS random source unavailable: {e}"),
            )
        })
    }
}

/// Deterministic seeds for tests: `start`, `start + 1`, ...
#[derive(Debug, Default)]
pub struct FixedSeedSource {
    next: AtomicU64,
}

impl FixedSeedSource {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl SeedSource for FixedSeedSource {
    fn next_seed(&self) -> Result<u64, DomainError> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst))
    }
}
