//! JSON gateway client for the remote map service
//!
//! ## Endpoints
//!
//! - `POST {base}/auth` with `{service, username, password}` → `{token}`
//! - `POST {base}/map_objects` (bearer token) with
//!   `{latitude, longitude, cell_ids, since_timestamp_ms}` → raw payload
//!
//! The gateway owns the service's own wire protocol; this client only
//! shuttles JSON.

use super::{Credential, MapSource, SourceError};
use crate::geo::{CellWindow, Coordinate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Authenticated gateway session
#[derive(Debug, Clone)]
pub struct HttpSession {
    pub username: String,
    token: String,
}

#[derive(Serialize)]
struct AuthRequest<'a> {
    service: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    token: String,
}

#[derive(Serialize)]
struct MapObjectsRequest<'a> {
    latitude: f64,
    longitude: f64,
    cell_ids: &'a [u64],
    since_timestamp_ms: Vec<i64>,
}

pub struct HttpMapSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMapSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MapSource for HttpMapSource {
    type Session = HttpSession;

    async fn authenticate(&self, credential: &Credential) -> Result<HttpSession, SourceError> {
        let url = format!("{}/auth", self.base_url);
        let request = AuthRequest {
            service: credential.service.as_str(),
            username: &credential.username,
            password: &credential.password,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::Authentication(format!(
                "{} rejected login for {}",
                response.status(),
                credential.username
            )));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Authentication(e.to_string()))?;
        if auth.token.is_empty() {
            return Err(SourceError::Authentication("empty session token".to_string()));
        }

        Ok(HttpSession {
            username: credential.username.clone(),
            token: auth.token,
        })
    }

    async fn query(
        &self,
        session: &mut HttpSession,
        position: Coordinate,
        cells: &CellWindow,
    ) -> Result<serde_json::Value, SourceError> {
        let url = format!("{}/map_objects", self.base_url);
        let request = MapObjectsRequest {
            latitude: position.lat,
            longitude: position.lng,
            cell_ids: cells.ids(),
            since_timestamp_ms: vec![0; cells.len()],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&session.token)
            .json(&request)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SourceError::Authentication(format!(
                "session for {} rejected",
                session.username
            )));
        }
        if !response.status().is_success() {
            return Err(SourceError::Transport(format!(
                "map objects request failed: {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
