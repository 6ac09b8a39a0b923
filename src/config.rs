//! Process configuration from environment variables
//!
//! Loaded once at startup (after `dotenv`). Required:
//! - `SOURCE_URL` - base URL of the remote map gateway
//! - `ACCOUNTS` - comma-separated `user` or `user:password` entries
//!
//! Everything else has a default; see `ScoutConfig::from_lookup`. `RUST_LOG`
//! is read by the binary before this runs so fallback warnings are logged.

use crate::source::{AuthService, Credential};
use crate::worker::WalkSettings;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkBackend {
    Http,
    Jsonl,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVariable(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub listen_addr: SocketAddr,
    pub source_url: String,
    pub accounts: Vec<Credential>,
    pub sink_backend: SinkBackend,
    pub sink_endpoint: String,
    pub sink_bearer: Option<String>,
    pub sink_output_path: String,
    pub sink_max_size_mb: u64,
    pub sink_max_rotations: u32,
    pub species_path: PathBuf,
    pub queue_depth_file: Option<PathBuf>,
    pub walk: WalkSettings,
}

impl ScoutConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_raw = var("LISTEN_ADDR").unwrap_or_else(|| "0.0.0.0:5000".to_string());
        let listen_addr = listen_raw
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidValue(format!("LISTEN_ADDR '{}'", listen_raw)))?;

        let source_url = var("SOURCE_URL")
            .ok_or_else(|| ConfigError::MissingVariable("SOURCE_URL".to_string()))?;
        if !source_url.starts_with("http://") && !source_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "SOURCE_URL must start with http:// or https://".to_string(),
            ));
        }

        let service_raw = var("AUTH_SERVICE").unwrap_or_else(|| "ptc".to_string());
        let service = AuthService::parse(&service_raw).ok_or_else(|| {
            ConfigError::InvalidValue(format!(
                "AUTH_SERVICE '{}' (expected 'ptc' or 'google')",
                service_raw
            ))
        })?;

        let accounts_raw = var("ACCOUNTS")
            .ok_or_else(|| ConfigError::MissingVariable("ACCOUNTS".to_string()))?;
        let accounts = parse_accounts(&accounts_raw, service, var("ACCOUNT_PASSWORD"))?;

        let sink_backend = match var("SINK_BACKEND")
            .unwrap_or_else(|| "http".to_string())
            .to_lowercase()
            .as_str()
        {
            "http" => SinkBackend::Http,
            "jsonl" => SinkBackend::Jsonl,
            other => {
                return Err(ConfigError::InvalidValue(format!(
                    "SINK_BACKEND '{}' (expected 'http' or 'jsonl')",
                    other
                )))
            }
        };

        let defaults = WalkSettings::default();
        let walk = WalkSettings {
            step_size: parse_checked_or(&var, "STEP_SIZE", defaults.step_size, |v: &f64| {
                v.is_finite() && *v > 0.0
            }),
            wild_step_limit: parse_or(&var, "WILD_STEP_LIMIT", defaults.wild_step_limit),
            static_step_limit: parse_or(&var, "STATIC_STEP_LIMIT", defaults.static_step_limit),
            jitter_max: parse_checked_or(&var, "JITTER_MAX", defaults.jitter_max, |v: &f64| {
                v.is_finite() && *v >= 0.0
            }),
            cell_radius: parse_or(&var, "CELL_RADIUS", defaults.cell_radius),
            throttle: Duration::from_millis(parse_or(
                &var,
                "THROTTLE_MS",
                defaults.throttle.as_millis() as u64,
            )),
            auth_retry_initial_ms: parse_or(&var, "AUTH_RETRY_INITIAL_MS", defaults.auth_retry_initial_ms),
            auth_retry_max_ms: parse_or(&var, "AUTH_RETRY_MAX_MS", defaults.auth_retry_max_ms),
        };

        Ok(Self {
            listen_addr,
            source_url,
            accounts,
            sink_backend,
            sink_endpoint: var("SINK_ENDPOINT").unwrap_or_else(|| "http://localhost:3000".to_string()),
            sink_bearer: var("SINK_BEARER"),
            sink_output_path: var("SINK_OUTPUT_PATH").unwrap_or_else(|| "mapobjects.jsonl".to_string()),
            sink_max_size_mb: parse_or(&var, "SINK_MAX_SIZE_MB", 100),
            sink_max_rotations: parse_or(&var, "SINK_MAX_ROTATIONS", 10),
            species_path: PathBuf::from(
                var("SPECIES_NAMES_PATH").unwrap_or_else(|| "pokenames.json".to_string()),
            ),
            queue_depth_file: var("QUEUE_DEPTH_FILE").map(PathBuf::from),
            walk,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    parse_checked_or(var, key, default, |_| true)
}

/// Parse `key`, falling back to `default` when unset, unparsable or rejected by `accept`
fn parse_checked_or<T, F, A>(var: &F, key: &str, default: T, accept: A) -> T
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
    A: Fn(&T) -> bool,
{
    let Some(raw) = var(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if accept(&value) => value,
        _ => {
            log::warn!("Invalid {} '{}', defaulting to {}", key, raw, default);
            default
        }
    }
}

fn parse_accounts(
    raw: &str,
    service: AuthService,
    shared_password: Option<String>,
) -> Result<Vec<Credential>, ConfigError> {
    let mut accounts = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (username, password) = match entry.split_once(':') {
            Some((user, pass)) => (user.to_string(), pass.to_string()),
            None => {
                let pass = shared_password.clone().ok_or_else(|| {
                    ConfigError::MissingVariable(format!(
                        "ACCOUNT_PASSWORD (account '{}' has no password)",
                        entry
                    ))
                })?;
                (entry.to_string(), pass)
            }
        };
        accounts.push(Credential {
            service,
            username,
            password,
        });
    }

    if accounts.is_empty() {
        return Err(ConfigError::InvalidValue("ACCOUNTS lists no accounts".to_string()));
    }
    Ok(accounts)
}
