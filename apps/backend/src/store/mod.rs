//! Storage seam consumed by the engine.
//!
//! Durable adapters live in the host application. Every mutating command
//! stages its writes in a `StoreTxn` and hands it to `commit`, which must
//! apply all of it or none of it.

pub mod memory;

use async_trait::async_trait;

use crate::domain::history::HistoryEvent;
use crate::domain::room::{Room, RoomStatus};
use crate::domain::snapshot::RoomSnapshot;
use crate::domain::state::{GameState, RoomId};
use crate::errors::domain::{DomainError, NotFoundKind};

pub use memory::InMemoryStore;

/// A staged write for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write<T> {
    Save(T),
    Delete,
}

/// All writes produced by one command for one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreTxn {
    pub room_id: RoomId,
    pub room: Option<Write<Room>>,
    pub game: Option<Write<GameState>>,
    pub history: Vec<HistoryEvent>,
}

impl StoreTxn {
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        Self {
            room_id: room_id.into(),
            room: None,
            game: None,
            history: Vec::new(),
        }
    }

    pub fn save_room(&mut self, room: Room) -> &mut Self {
        self.room = Some(Write::Save(room));
        self
    }

    pub fn delete_room(&mut self) -> &mut Self {
        self.room = Some(Write::Delete);
        self
    }

    pub fn save_game_state(&mut self, game: GameState) -> &mut Self {
        self.game = Some(Write::Save(game));
        self
    }

    pub fn delete_game_state(&mut self) -> &mut Self {
        self.game = Some(Write::Delete);
        self
    }

    pub fn append_history(&mut self, event: HistoryEvent) -> &mut Self {
        self.history.push(event);
        self
    }

    /// Stage the post-command snapshot; `None` drops the room and its game.
    pub fn stage_snapshot(&mut self, snapshot: Option<&RoomSnapshot>) -> &mut Self {
        match snapshot {
            Some(s) => {
                self.save_room(s.room.clone());
                match &s.game {
                    Some(game) => self.save_game_state(game.clone()),
                    None => self.delete_game_state(),
                };
            }
            None => {
                self.delete_room();
                self.delete_game_state();
            }
        }
        self
    }
}

#[async_trait]
pub trait GameStore: Send + Sync {
    async fn load_room(&self, room_id: &str) -> Result<Option<Room>, DomainError>;

    async fn load_game_state(&self, room_id: &str) -> Result<Option<GameState>, DomainError>;

    /// Full history in sequence order. Survives room deletion.
    async fn load_history(&self, room_id: &str) -> Result<Vec<HistoryEvent>, DomainError>;

    /// 0 when the room has no history.
    async fn last_sequence_no(&self, room_id: &str) -> Result<u64, DomainError>;

    /// Apply every staged write atomically. History appends must continue the
    /// room's sequence exactly; otherwise nothing is written.
    async fn commit(&self, txn: StoreTxn) -> Result<(), DomainError>;
}

/// Load room and game together, checking they agree.
pub async fn load_snapshot(
    store: &dyn GameStore,
    room_id: &str,
) -> Result<Option<RoomSnapshot>, DomainError> {
    let Some(room) = store.load_room(room_id).await? else {
        return Ok(None);
    };
    let game = store.load_game_state(room_id).await?;
    if room.status == RoomStatus::InGame && game.is_none() {
        return Err(DomainError::not_found(
            NotFoundKind::GameState,
            format!("room {room_id} is in game but its game state is missing"),
        ));
    }
    Ok(Some(RoomSnapshot { room, game }))
}
