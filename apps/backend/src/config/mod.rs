pub mod settings;

pub use settings::{LogFormat, RuntimeEnv, Settings};
