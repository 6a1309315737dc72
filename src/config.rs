//! Runtime settings, read from the environment (a `.env` file is honoured).

use std::env;
use std::time::Duration;

use url::form_urlencoded::byte_serialize;

use crate::error::{MigrationError, Result};

pub const DEFAULT_DATABASE: &str = "dollar_bill";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub mongo_uri: String,
    pub database: String,
    pub server_selection_timeout: Duration,
    pub connect_timeout: Duration,
    pub seed_sample_group: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let database = get("MONGO_DBNAME").unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let mongo_uri = match get("MONGODB_URI") {
            Some(uri) => uri,
            None => {
                let (Some(user), Some(pass), Some(host)) =
                    (get("MONGO_USER"), get("MONGO_PASS"), get("MONGO_HOST"))
                else {
                    return Err(MigrationError::Config(
                        "set MONGODB_URI, or MONGO_USER, MONGO_PASS and MONGO_HOST".into(),
                    ));
                };
                atlas_uri(&user, &pass, &host, &database)
            }
        };
        if !(mongo_uri.starts_with("mongodb://") || mongo_uri.starts_with("mongodb+srv://")) {
            return Err(MigrationError::Config(
                "connection string must start with mongodb:// or mongodb+srv://".into(),
            ));
        }

        Ok(Settings {
            mongo_uri,
            database,
            server_selection_timeout: parse_millis(&get, "MONGODB_SERVER_SELECTION_TIMEOUT_MS", 5000)?,
            connect_timeout: parse_millis(&get, "MONGODB_CONNECT_TIMEOUT_MS", 10_000)?,
            seed_sample_group: parse_bool(&get, "SEED_SAMPLE_GROUP", true)?,
        })
    }
}

fn encode(raw: &str) -> String {
    byte_serialize(raw.as_bytes()).collect()
}

/// `mongodb+srv` connection string with percent-encoded credentials.
pub fn atlas_uri(user: &str, pass: &str, host: &str, database: &str) -> String {
    format!(
        "mongodb+srv://{}:{}@{}/{}?retryWrites=true&w=majority",
        encode(user),
        encode(pass),
        host,
        database
    )
}

fn parse_millis(get: &dyn Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<Duration> {
    match get(key) {
        None => Ok(Duration::from_millis(default)),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_millis)
            .map_err(|_| MigrationError::Config(format!("{} must be a number of milliseconds, got '{}'", key, raw))),
    }
}

fn parse_bool(get: &dyn Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    match get(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(MigrationError::Config(format!("{} must be true or false, got '{}'", key, v))),
        },
    }
}
