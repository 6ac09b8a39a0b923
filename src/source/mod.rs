//! Remote map source boundary
//!
//! The worker only needs two calls from the remote service: log in with an
//! account, then fetch raw map objects for a CellWindow. `MapSource` is that
//! seam; `HttpMapSource` talks to a JSON gateway and tests script their own.

pub mod decode;
pub mod http_source;

pub use decode::{decode_map_objects, DecodeError, MapCell, MapObjects, StaticEntity, Team, TransientEntity};
pub use http_source::{HttpMapSource, HttpSession};

use crate::geo::{CellWindow, Coordinate};
use async_trait::async_trait;

/// Login provider accepted by the remote service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthService {
    Ptc,
    Google,
}

impl AuthService {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthService::Ptc => "ptc",
            AuthService::Google => "google",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "ptc" => Some(AuthService::Ptc),
            "google" => Some(AuthService::Google),
            _ => None,
        }
    }
}

/// One account; each worker owns exactly one
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub service: AuthService,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("service", &self.service)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug)]
pub enum SourceError {
    Authentication(String),
    Transport(String),
    Status(i64),
    Decode(DecodeError),
}

impl From<DecodeError> for SourceError {
    fn from(err: DecodeError) -> Self {
        SourceError::Decode(err)
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Transport(err.to_string())
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            SourceError::Transport(msg) => write!(f, "Transport error: {}", msg),
            SourceError::Status(code) => write!(f, "Map objects status {}", code),
            SourceError::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for SourceError {}

#[async_trait]
pub trait MapSource: Send + Sync {
    /// Authenticated handle, owned by one worker at a time
    type Session: Send;

    /// Log in with one account
    async fn authenticate(&self, credential: &Credential) -> Result<Self::Session, SourceError>;

    /// Fetch the raw map objects payload for `cells`, observed from `position`
    async fn query(
        &self,
        session: &mut Self::Session,
        position: Coordinate,
        cells: &CellWindow,
    ) -> Result<serde_json::Value, SourceError>;
}
