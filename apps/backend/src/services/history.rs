//! History inspection: replay, consistency check and recovery.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::history::{replay, HistoryEvent};
use crate::domain::snapshot::RoomSnapshot;
use crate::services::mutation::{invalidate_cached, refresh_cached};
use crate::state::app_state::AppState;
use crate::store::{load_snapshot, StoreTxn};
use crate::AppError;

/// Live state compared with the state rebuilt from history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    pub room_id: String,
    pub events: usize,
    pub live_digest: String,
    pub replayed_digest: String,
    pub consistent: bool,
}

#[derive(Default)]
pub struct HistoryRecorder;

impl HistoryRecorder {
    pub async fn load(
        &self,
        state: &AppState,
        room_id: &str,
    ) -> Result<Vec<HistoryEvent>, AppError> {
        Ok(state.store().load_history(room_id).await?)
    }

    /// Rebuild the room from its full history.
    pub async fn replay(
        &self,
        state: &AppState,
        room_id: &str,
    ) -> Result<Option<RoomSnapshot>, AppError> {
        let events = self.load(state, room_id).await?;
        Ok(replay(&events)?)
    }

    /// Compare the stored state with its replay, byte for byte.
    pub async fn verify(
        &self,
        state: &AppState,
        room_id: &str,
    ) -> Result<ConsistencyReport, AppError> {
        let guard = state.locks.lock(room_id).await;
        let checked = self.compare(state, room_id).await;
        let room_stored = matches!(&checked, Ok((true, _)));
        state.locks.release(room_id, guard, room_stored);
        Ok(checked?.1)
    }

    async fn compare(
        &self,
        state: &AppState,
        room_id: &str,
    ) -> Result<(bool, ConsistencyReport), AppError> {
        let events = state.store().load_history(room_id).await?;
        let replayed = replay(&events)?;
        let live = load_snapshot(state.store(), room_id).await?;

        let live_digest = digest(&live)?;
        let replayed_digest = digest(&replayed)?;
        let consistent = live_digest == replayed_digest;
        if !consistent {
            warn!(room_id, events = events.len(), "live state diverges from history");
        }

        let report = ConsistencyReport {
            room_id: room_id.to_string(),
            events: events.len(),
            live_digest,
            replayed_digest,
            consistent,
        };
        Ok((live.is_some(), report))
    }

    /// Overwrite the stored state with its replay. History is untouched.
    pub async fn recover(
        &self,
        state: &AppState,
        room_id: &str,
    ) -> Result<Option<RoomSnapshot>, AppError> {
        let guard = state.locks.lock(room_id).await;
        let recovered = self.rewrite(state, room_id).await;
        let room_stored = matches!(&recovered, Ok(Some(_)));
        state.locks.release(room_id, guard, room_stored);
        recovered
    }

    async fn rewrite(
        &self,
        state: &AppState,
        room_id: &str,
    ) -> Result<Option<RoomSnapshot>, AppError> {
        let events = state.store().load_history(room_id).await?;
        let replayed = replay(&events)?;

        let mut txn = StoreTxn::new(room_id);
        txn.stage_snapshot(replayed.as_ref());
        if let Err(e) = state.store().commit(txn).await {
            invalidate_cached(state, room_id).await;
            return Err(e.into());
        }
        match &replayed {
            Some(snapshot) => refresh_cached(state, Arc::new(snapshot.clone())).await,
            None => invalidate_cached(state, room_id).await,
        }

        info!(room_id, events = events.len(), "room state recovered from history");
        Ok(replayed)
    }
}

fn digest(snapshot: &Option<RoomSnapshot>) -> Result<String, AppError> {
    let bytes = serde_json::to_vec(snapshot)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
