//! Gotify push sink.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{config::GotifyConfig, Error, Result};

/// Body of Gotify's `POST /message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GotifyMessage {
    pub title: String,
    pub message: String,
    pub priority: i32,
}

/// Delivers one notification and reports the HTTP status the receiver answered with.
///
/// Any received status counts as delivered; only failing to get a response at
/// all is an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &GotifyMessage) -> Result<u16>;
}

pub struct GotifyClient {
    client: Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl GotifyClient {
    pub fn new(config: &GotifyConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.strip_suffix('/').unwrap_or(config.url.as_str()).to_string(),
            token: config.token.clone(),
            timeout: config.timeout,
        }
    }

    pub fn message_url(&self) -> String {
        format!("{}/message", self.base_url)
    }
}

#[async_trait]
impl Notifier for GotifyClient {
    async fn send(&self, message: &GotifyMessage) -> Result<u16> {
        let body = serde_json::to_vec(message).map_err(|e| Error::Serialization(e.to_string()))?;

        let response = self
            .client
            .post(self.message_url())
            .query(&[("token", self.token.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Delivery(format!("timed out after {:?}: {}", self.timeout, e))
                } else {
                    Error::Delivery(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Gotify answered with a non-success status");
        } else {
            debug!(status = status.as_u16(), "Gotify accepted message");
        }

        Ok(status.as_u16())
    }
}
