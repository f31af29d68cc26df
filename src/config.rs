use std::env;
use std::fmt;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    /// Raw cookie key material; `None` when unset or too short.
    pub session_key: Option<String>,
    pub seed_demo: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { var: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "{var} must be set"),
            ConfigError::Invalid { var, value } => write!(f, "{var} has an invalid value: '{value}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Minimum key length accepted by `actix_web::cookie::Key::from`.
pub const SESSION_KEY_MIN_LEN: usize = 64;

impl AppConfig {
    /// Load from the process environment (call `dotenvy::dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid { var: "DB_MAX_CONNECTIONS", value: v })?,
            None => 8,
        };

        let session_key = match lookup("SESSION_KEY") {
            Some(val) if val.len() >= SESSION_KEY_MIN_LEN => Some(val),
            Some(val) => {
                log::warn!(
                    "SESSION_KEY too short ({} bytes, need {SESSION_KEY_MIN_LEN}+) — generating random key",
                    val.len()
                );
                None
            }
            None => {
                log::warn!("No SESSION_KEY set — generating random key (sessions lost on restart)");
                None
            }
        };

        let seed_demo = lookup("SEED_DEMO")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self { database_url, bind_addr, db_max_connections, session_key, seed_demo })
    }
}
