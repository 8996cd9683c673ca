//! Services: the engine's use cases over `AppState`.
//!
//! Every mutating command goes through `mutation::run_mutation`, which holds
//! the room lock from load until the commit has landed.

pub mod dispatcher;
pub mod game_flow;
pub mod history;
pub mod mutation;
pub mod registry;
pub mod room_locks;

pub use dispatcher::CommandDispatcher;
pub use game_flow::GameFlowService;
pub use history::{ConsistencyReport, HistoryRecorder};
pub use mutation::{run_mutation, MutationOutcome};
pub use registry::RoomRegistry;
