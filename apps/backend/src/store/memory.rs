//! In-memory `GameStore`.
//!
//! One mutex guards all three tables, which makes `commit` trivially
//! atomic. `fail_next_commits` injects storage failures for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{GameStore, StoreTxn, Write};
use crate::domain::history::HistoryEvent;
use crate::domain::room::Room;
use crate::domain::state::{GameState, RoomId};
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind};

#[derive(Debug, Default)]
struct Tables {
    rooms: HashMap<RoomId, Room>,
    games: HashMap<RoomId, GameState>,
    history: HashMap<RoomId, Vec<HistoryEvent>>,
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_commits: AtomicU32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` commits fail with a database error, writing nothing.
    pub fn fail_next_commits(&self, n: u32) {
        self.fail_commits.store(n, Ordering::SeqCst);
    }

    pub fn room_count(&self) -> usize {
        self.tables.lock().rooms.len()
    }

    /// Overwrite a stored game state without touching history.
    ///
    /// Only for exercising consistency tooling against a diverged store.
    pub fn overwrite_game_state(&self, room_id: &str, game: GameState) {
        self.tables.lock().games.insert(room_id.to_string(), game);
    }

    fn take_injected_failure(&self) -> bool {
        self.fail_commits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl GameStore for InMemoryStore {
    async fn load_room(&self, room_id: &str) -> Result<Option<Room>, DomainError> {
        Ok(self.tables.lock().rooms.get(room_id).cloned())
    }

    async fn load_game_state(&self, room_id: &str) -> Result<Option<GameState>, DomainError> {
        Ok(self.tables.lock().games.get(room_id).cloned())
    }

    async fn load_history(&self, room_id: &str) -> Result<Vec<HistoryEvent>, DomainError> {
        Ok(self
            .tables
            .lock()
            .history
            .get(room_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn last_sequence_no(&self, room_id: &str) -> Result<u64, DomainError> {
        Ok(self
            .tables
            .lock()
            .history
            .get(room_id)
            .and_then(|h| h.last())
            .map(|e| e.sequence_no)
            .unwrap_or(0))
    }

    async fn commit(&self, txn: StoreTxn) -> Result<(), DomainError> {
        if self.take_injected_failure() {
            warn!(room_id = %txn.room_id, "injected commit failure");
            return Err(DomainError::infra(
                InfraErrorKind::Database,
                "injected commit failure",
            ));
        }

        let mut tables = self.tables.lock();

        // Validate everything before the first write.
        let mut last = tables
            .history
            .get(&txn.room_id)
            .and_then(|h| h.last())
            .map(|e| e.sequence_no)
            .unwrap_or(0);
        for event in &txn.history {
            if event.room_id != txn.room_id || event.sequence_no != last + 1 {
                return Err(DomainError::conflict(
                    ConflictKind::HistorySequence,
                    format!(
                        "append out of sequence for room {}: expected {}, got {}",
                        txn.room_id,
                        last + 1,
                        event.sequence_no
                    ),
                ));
            }
            last = event.sequence_no;
        }

        match txn.room {
            Some(Write::Save(room)) => {
                tables.rooms.insert(txn.room_id.clone(), room);
            }
            Some(Write::Delete) => {
                tables.rooms.remove(&txn.room_id);
            }
            None => {}
        }
        match txn.game {
            Some(Write::Save(game)) => {
                tables.games.insert(txn.room_id.clone(), game);
            }
            Some(Write::Delete) => {
                tables.games.remove(&txn.room_id);
            }
            None => {}
        }
        let appended = txn.history.len();
        tables
            .history
            .entry(txn.room_id.clone())
            .or_default()
            .extend(txn.history);

        debug!(room_id = %txn.room_id, appended, last_sequence_no = last, "commit applied");
        Ok(())
    }
}
