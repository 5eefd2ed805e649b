// SPDX-FileCopyrightText: 2026 Carelink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the telemedicine backend REST API.
//!
//! Provides [`ApiClient`] which handles request construction, bearer
//! authentication, timeout enforcement, and mapping of HTTP statuses onto
//! the Carelink error taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use carelink_core::error::CarelinkError;
use carelink_core::traits::{AppointmentStore, MessageTransport};
use carelink_core::types::{Appointment, AppointmentId, ChatMessage, OutgoingMessage};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Wire shape of `GET /messages/{id}/unread`.
#[derive(Debug, Deserialize)]
struct UnreadResponse {
    unread: u64,
}

/// HTTP client for the telemedicine backend.
///
/// One instance serves both adapter traits; clone freely, the underlying
/// connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Creates a new API client.
    ///
    /// # Arguments
    /// * `base_url` - Backend base URL, e.g. `https://api.clinic.example/api`
    /// * `bearer_token` - Token sent as `Authorization: Bearer ...` on every call
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, CarelinkError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| CarelinkError::Config(format!("invalid bearer token: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CarelinkError::Transport {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Returns the unread message count for an appointment.
    pub async fn unread_count(
        &self,
        appointment_id: &AppointmentId,
    ) -> Result<u64, CarelinkError> {
        let response: UnreadResponse = self
            .get_json(&format!("/messages/{appointment_id}/unread"))
            .await?;
        Ok(response.unread)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CarelinkError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;
        self.decode(path, response).await
    }

    async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CarelinkError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;
        self.decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, CarelinkError> {
        let status = response.status();
        debug!(status = %status, path, "backend response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, path, &body));
        }

        let body = response.text().await.map_err(|e| CarelinkError::Transport {
            message: format!("failed to read response body for {path}: {e}"),
            source: Some(Box::new(e)),
        })?;
        serde_json::from_str(&body).map_err(|e| CarelinkError::Transport {
            message: format!("failed to parse response for {path}: {e}"),
            source: Some(Box::new(e)),
        })
    }

    fn map_request_error(&self, err: reqwest::Error) -> CarelinkError {
        if err.is_timeout() {
            CarelinkError::Timeout {
                duration: self.timeout,
            }
        } else {
            CarelinkError::Transport {
                message: format!("HTTP request failed: {err}"),
                source: Some(Box::new(err)),
            }
        }
    }

    /// Maps a non-2xx status onto the error taxonomy.
    ///
    /// The backend returns a JSON object with an `error` field on failure;
    /// its text is folded into the transport message when present.
    fn map_status(status: StatusCode, path: &str, body: &str) -> CarelinkError {
        match status {
            StatusCode::UNAUTHORIZED => CarelinkError::Unauthorized,
            StatusCode::FORBIDDEN => CarelinkError::Forbidden,
            StatusCode::NOT_FOUND => CarelinkError::NotFound(path.to_string()),
            _ => {
                let detail = serde_json::from_str::<serde_json::Value>(body)
                    .ok()
                    .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                    .unwrap_or_else(|| body.to_string());
                CarelinkError::Transport {
                    message: format!("backend returned {status} for {path}: {detail}"),
                    source: None,
                }
            }
        }
    }
}

#[async_trait]
impl AppointmentStore for ApiClient {
    async fn list_appointments(&self) -> Result<Vec<Appointment>, CarelinkError> {
        self.get_json("/appointments").await
    }
}

#[async_trait]
impl MessageTransport for ApiClient {
    async fn fetch_messages(
        &self,
        appointment_id: &AppointmentId,
    ) -> Result<Vec<ChatMessage>, CarelinkError> {
        self.get_json(&format!("/messages/{appointment_id}")).await
    }

    async fn send_message(
        &self,
        appointment_id: &AppointmentId,
        outgoing: &OutgoingMessage,
    ) -> Result<ChatMessage, CarelinkError> {
        self.post_json(&format!("/messages/{appointment_id}"), outgoing)
            .await
    }
}
