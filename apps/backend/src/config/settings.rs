//! Process settings, read once from the environment at startup.
//!
//! Engine logic never reads the environment; everything it needs arrives
//! through `Settings` and the `AppState` built from it.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::rules::RuleSet;
use crate::error::AppError;

pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnv {
    Dev,
    Test,
    Prod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub app_env: RuntimeEnv,
    pub log_level: String,
    pub log_format: LogFormat,
    pub log_file: Option<PathBuf>,
    pub database_url: String,
    pub cache_max_rooms: u64,
    /// `None` disables the cache.
    pub cache_ttl: Option<Duration>,
    pub rules_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_env: RuntimeEnv::Dev,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            log_file: None,
            database_url: MEMORY_DATABASE_URL.to_string(),
            cache_max_rooms: 10_000,
            cache_ttl: Some(Duration::from_secs(1800)),
            rules_path: None,
        }
    }
}

impl Settings {
    /// Read settings from the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Settings::default();

        let app_env = match var("APP_ENV").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("dev") => RuntimeEnv::Dev,
            Some("test") => RuntimeEnv::Test,
            Some("prod") => RuntimeEnv::Prod,
            Some(other) => {
                return Err(AppError::config(format!(
                    "APP_ENV must be one of dev, test, prod (got '{other}')"
                )))
            }
        };

        let log_format = var("LOG_FORMAT").map(|v| v.to_ascii_uppercase());
        let log_format = match log_format.as_deref() {
            None | Some("TEXT") => LogFormat::Text,
            Some("JSON") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::config(format!(
                    "LOG_FORMAT must be TEXT or JSON (got '{other}')"
                )))
            }
        };

        let database_url = var("DATABASE_URL").unwrap_or(defaults.database_url);
        if !database_url.starts_with(MEMORY_DATABASE_URL) {
            return Err(AppError::config(format!(
                "DATABASE_URL scheme not supported by this build: '{}'",
                scheme_of(&database_url)
            )));
        }

        let cache_max_rooms = match var("CACHE_MAX_ROOMS") {
            Some(raw) => parse_number::<u64>("CACHE_MAX_ROOMS", &raw)?,
            None => defaults.cache_max_rooms,
        };
        let cache_ttl = match var("CACHE_TTL_SECS") {
            Some(raw) => match parse_number::<u64>("CACHE_TTL_SECS", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.cache_ttl,
        };

        Ok(Self {
            app_env,
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
            log_file: var("LOG_FILE").map(PathBuf::from),
            database_url,
            cache_max_rooms,
            cache_ttl,
            rules_path: var("AVALON_RULES_PATH").map(PathBuf::from),
        })
    }

    /// The published ruleset, or the validated override at `rules_path`.
    pub fn load_rules(&self) -> Result<RuleSet, AppError> {
        let Some(path) = &self.rules_path else {
            return Ok(RuleSet::standard());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::config(format!("cannot read rules file {}: {e}", path.display()))
        })?;
        RuleSet::from_json(&raw)
            .map_err(|e| AppError::config(format!("invalid rules file {}: {e}", path.display())))
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.parse::<T>().map_err(|_| {
        AppError::config(format!("{key} must be a non-negative integer (got '{raw}')"))
    })
}

// Only the scheme is echoed back; URLs can carry credentials.
fn scheme_of(url: &str) -> &str {
    url.split("://").next().unwrap_or("")
}
