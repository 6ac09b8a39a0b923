//! Bulk push of map items to the downstream map service
//!
//! `POST {endpoint}/api/push/mapobject/bulk` with `Authorization: Bearer
//! {token}` and a JSON array body. Without a token, or with an empty batch,
//! nothing is sent.

use super::{MapSink, SinkError};
use crate::aggregate::OutputItem;
use async_trait::async_trait;
use std::time::Duration;

pub struct HttpSink {
    client: reqwest::Client,
    endpoint: String,
    bearer: Option<String>,
}

impl HttpSink {
    pub fn new(endpoint: &str, bearer: Option<String>) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bearer: bearer.filter(|token| !token.is_empty()),
        })
    }

    pub fn bulk_url(&self) -> String {
        format!("{}/api/push/mapobject/bulk", self.endpoint)
    }
}

#[async_trait]
impl MapSink for HttpSink {
    async fn deliver(&self, items: &[OutputItem]) -> Result<(), SinkError> {
        let Some(token) = &self.bearer else {
            log::debug!("No sink token configured, dropping {} items", items.len());
            return Ok(());
        };
        if items.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(self.bulk_url())
            .bearer_auth(token)
            .json(items)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SinkError::Status(response.status().as_u16()));
        }

        log::debug!("✅ Pushed {} items to {}", items.len(), self.endpoint);
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "HTTP"
    }
}
