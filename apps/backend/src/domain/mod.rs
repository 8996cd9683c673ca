//! Domain layer: pure game logic types and helpers.

pub mod game_transition;
pub mod history;
pub mod phase_machine;
pub mod player_view;
pub mod roles;
pub mod room;
pub mod rules;
pub mod snapshot;
pub mod state;
pub mod tally;

#[cfg(test)]
mod test_state_helpers;
#[cfg(test)]
mod tests_props_game;

// Re-exports for ergonomics
pub use game_transition::GameTransition;
pub use history::{replay, HistoryEvent, RecordedCommand};
pub use phase_machine::{apply_action, start_game, GameAction};
pub use player_view::{GameView, RoomView};
pub use roles::{assign_roles, role_view, RoleView};
pub use room::{Room, RoomStatus};
pub use rules::RuleSet;
pub use snapshot::{apply_command, Applied, RoomSnapshot};
pub use state::{
    Alignment, GameOutcome, GameState, MissionAction, MissionResult, Phase, Role, RoomId,
    UserId, VictoryReason, Vote,
};
