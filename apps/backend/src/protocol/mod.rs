//! Ingress-facing command and response shapes.

pub mod command;
pub mod ingress;
pub mod response;

pub use command::{validate_identifier, Command};
pub use ingress::{CommandRequest, Reply};
pub use response::{CommandResponse, ErrorResponse};
