//! The network side of a query: sending a [`Request`] and getting back either
//! a [`Response`] or a [`TransportError`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use std::error::Error as _;
use std::fmt;
use std::time::Duration;

use super::request::{Request, Response};

/// Sends one request. Implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

/// Broad class of a transport failure, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Body,
    Request,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Timeout => "Timeout",
            TransportErrorKind::Connect => "ConnectionError",
            TransportErrorKind::Body => "BodyError",
            TransportErrorKind::Request => "RequestError",
            TransportErrorKind::Other => "TransportError",
        };
        f.write_str(name)
    }
}

/// No HTTP response was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    kind: TransportErrorKind,
    message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else if error.is_body() || error.is_decode() {
            TransportErrorKind::Body
        } else if error.is_request() || error.is_builder() {
            TransportErrorKind::Request
        } else {
            TransportErrorKind::Other
        };

        // The URL carries the API key; keep it out of the message.
        let error = error.without_url();
        let mut message = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self { kind, message }
    }
}

/// [`Transport`] backed by a shared `reqwest::Client`, so connections are
/// reused across every page of a run.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client used for a run. Without `timeout` the reqwest
    /// defaults apply.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self> {
        let mut builder =
            Client::builder().user_agent(concat!("subsearch/", env!("SUBSEARCH_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request))]
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        debug!("GET {}", request.display_url());

        let response = self
            .client
            .get(&request.url)
            .query(&request.params)
            .send()
            .await?;

        let url = response.url().to_string();
        let status = response.status();

        // A 401 must reach the status check even if its body is lost.
        let body = if status == StatusCode::UNAUTHORIZED {
            response.text().await.unwrap_or_default()
        } else {
            response.text().await?
        };
        let status = status.as_u16();

        Ok(Response { url, status, body })
    }
}
