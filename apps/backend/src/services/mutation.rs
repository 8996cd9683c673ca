use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::domain::game_transition::GameTransition;
use crate::domain::history::{HistoryEvent, RecordedCommand};
use crate::domain::player_view::public_view;
use crate::domain::snapshot::{apply_command, RoomSnapshot};
use crate::protocol::response::CommandResponse;
use crate::state::app_state::AppState;
use crate::store::{load_snapshot, StoreTxn};
use crate::AppError;

/// Result of one committed command.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// `None` when the command abandoned the room.
    pub snapshot: Option<Arc<RoomSnapshot>>,
    pub transitions: Vec<GameTransition>,
    pub sequence_no: u64,
}

impl MutationOutcome {
    pub fn into_response(self) -> CommandResponse {
        let (room, game) = match self.snapshot.as_deref().map(public_view) {
            Some((room, game)) => (Some(room), game),
            None => (None, None),
        };
        CommandResponse {
            room,
            game,
            transitions: self.transitions,
            role: None,
            sequence_no: Some(self.sequence_no),
        }
    }
}

/// Current snapshot for `room_id`: cache first, then the store.
///
/// A failing cache is bypassed, never fatal.
pub async fn load_current(
    state: &AppState,
    room_id: &str,
) -> Result<Option<Arc<RoomSnapshot>>, AppError> {
    if let Some(cache) = state.cache() {
        match cache.get(room_id).await {
            Ok(Some(hit)) => return Ok(Some(hit)),
            Ok(None) => {}
            Err(e) => warn!(room_id, error = %e, "cache read failed; using store"),
        }
    }
    Ok(load_snapshot(state.store(), room_id).await?.map(Arc::new))
}

/// Apply one recorded command to `room_id` under its lock and persist the
/// result together with its history event.
///
/// Nothing is visible to other commands until the commit succeeds; on any
/// error the stored state is unchanged and the cache entry is dropped.
pub async fn run_mutation(
    state: &AppState,
    room_id: &str,
    actor: &str,
    command: RecordedCommand,
) -> Result<MutationOutcome, AppError> {
    let guard = state.locks.lock(room_id).await;
    let current = load_current(state, room_id).await;
    let stored_before = matches!(current, Ok(Some(_)));
    let result = match current {
        Ok(current) => mutate_locked(state, room_id, actor, command, current).await,
        Err(e) => Err(e),
    };

    let room_stored = match &result {
        Ok(outcome) => outcome.snapshot.is_some(),
        Err(_) => stored_before,
    };
    if state.locks.release(room_id, guard, room_stored) {
        debug!(room_id, "room lock reclaimed");
    }
    result
}

async fn mutate_locked(
    state: &AppState,
    room_id: &str,
    actor: &str,
    command: RecordedCommand,
    current: Option<Arc<RoomSnapshot>>,
) -> Result<MutationOutcome, AppError> {
    let applied = apply_command(room_id, current.as_deref(), actor, &command)?;

    let sequence_no = state.store().last_sequence_no(room_id).await? + 1;
    let snapshot = applied.snapshot.map(Arc::new);
    let event = HistoryEvent {
        sequence_no,
        room_id: room_id.to_string(),
        actor_user_id: actor.to_string(),
        command,
        resulting_phase: snapshot.as_ref().and_then(|s| s.phase()),
        room_status: snapshot.as_ref().map(|s| s.room.status),
        timestamp: OffsetDateTime::now_utc(),
    };
    let command_name = event.command.name();

    let mut txn = StoreTxn::new(room_id);
    txn.stage_snapshot(snapshot.as_deref()).append_history(event);

    if let Err(e) = state.store().commit(txn).await {
        warn!(room_id, command = command_name, error = %e, "commit failed");
        invalidate_cached(state, room_id).await;
        return Err(e.into());
    }

    match &snapshot {
        Some(s) => refresh_cached(state, Arc::clone(s)).await,
        None => invalidate_cached(state, room_id).await,
    }

    debug!(
        room_id,
        command = command_name,
        sequence_no,
        phase = ?snapshot.as_ref().and_then(|s| s.phase()),
        transitions = applied.transitions.len(),
        "command committed"
    );

    Ok(MutationOutcome {
        snapshot,
        transitions: applied.transitions,
        sequence_no,
    })
}

pub(crate) async fn refresh_cached(state: &AppState, snapshot: Arc<RoomSnapshot>) {
    if let Some(cache) = state.cache() {
        let room_id = snapshot.room_id().to_string();
        if let Err(e) = cache.put(snapshot).await {
            warn!(room_id, error = %e, "cache refresh failed; invalidating");
            invalidate_cached(state, &room_id).await;
        }
    }
}

pub(crate) async fn invalidate_cached(state: &AppState, room_id: &str) {
    if let Some(cache) = state.cache() {
        if let Err(e) = cache.invalidate(room_id).await {
            warn!(room_id, error = %e, "cache invalidation failed");
        }
    }
}
