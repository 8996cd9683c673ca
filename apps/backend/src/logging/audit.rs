//! Audit events for information-sensitive or refused actions.

use tracing::{info, warn};

use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// A player looked at their secret role.
pub fn role_revealed(room_id: &str, user_id: &str, first: bool) {
    let trace_id = trace_ctx::trace_id();

    info!(
        event = "AUDIT_ROLE_REVEALED",
        %trace_id,
        room_id,
        user = %Redacted(user_id),
        first,
        "Role revealed to player"
    );
}

/// A command was refused because the actor lacks the authority for it.
pub fn unauthorized_action(room_id: &str, user_id: &str, command: &str, code: &str) {
    let trace_id = trace_ctx::trace_id();

    warn!(
        event = "AUDIT_UNAUTHORIZED_ACTION",
        %trace_id,
        room_id,
        user = %Redacted(user_id),
        command,
        code,
        "Action refused"
    );
}
