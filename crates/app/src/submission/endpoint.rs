//! HTTP client for the remote order endpoint.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, header::ACCEPT};
use serde::Deserialize;
use thiserror::Error;

use crate::{config::submission::EndpointKind, submission::payload::OrderSubmission};

/// Errors that can occur when delivering an order.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The request could not be built, could not be sent, or timed out.
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,

        /// Response body, if readable
        body: String,
    },

    /// The endpoint answered 2xx but did not acknowledge the order.
    #[error("endpoint rejected the order: {0}")]
    Rejected(String),

    /// The response body was not the expected JSON.
    #[error("unexpected response from endpoint: {0}")]
    InvalidResponse(#[source] reqwest::Error),
}

impl DispatchError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(error) => !error.is_builder(),
            Self::Status { status, .. } => *status >= 500,
            Self::Rejected(_) | Self::InvalidResponse(_) => false,
        }
    }
}

/// Delivers a single order to wherever orders are collected.
#[automock]
#[async_trait]
pub trait OrderDispatcher: Send + Sync {
    /// Deliver `submission`, succeeding only if the receiver acknowledged it.
    async fn dispatch(&self, submission: &OrderSubmission) -> Result<(), DispatchError>;
}

/// POSTs orders as JSON to a Formspree or Apps Script endpoint.
#[derive(Debug, Clone)]
pub struct FormEndpointClient {
    http: Client,
    url: String,
    kind: EndpointKind,
    cc: Option<String>,
}

impl FormEndpointClient {
    /// Create a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        url: impl Into<String>,
        kind: EndpointKind,
        cc: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            url: url.into(),
            kind,
            cc,
        })
    }
}

#[async_trait]
impl OrderDispatcher for FormEndpointClient {
    async fn dispatch(&self, submission: &OrderSubmission) -> Result<(), DispatchError> {
        let request = self.http.post(&self.url).header(ACCEPT, "application/json");

        let request = match self.kind {
            EndpointKind::Formspree => request.json(&submission.formspree_form(self.cc.as_deref())),
            EndpointKind::AppsScript => request.json(submission),
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let ack: EndpointAck = response
            .json()
            .await
            .map_err(DispatchError::InvalidResponse)?;

        if ack.ok || ack.success {
            Ok(())
        } else {
            Err(DispatchError::Rejected(ack.error.map_or_else(
                || "no acknowledgement in response".to_string(),
                |error| error.to_string(),
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
struct EndpointAck {
    #[serde(default)]
    ok: bool,

    #[serde(default)]
    success: bool,

    #[serde(default)]
    error: Option<serde_json::Value>,
}
