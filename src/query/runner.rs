//! Sending a query with bounded, immediate retries.

use log::{debug, error, info};
use serde_json::Value;

use super::classify::{Attempt, Outcome, classify};
use super::error::QueryError;
use crate::http::{API_KEY_PARAM, Request, Transport};

/// Retries after the first attempt, unless configured otherwise.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Decoded payload of a successful query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutput {
    pub payload: Value,
    /// Retries it took; 0 when the first attempt succeeded.
    pub retries: usize,
}

/// Runs queries over one transport session, authenticating every request
/// with the same API key.
pub struct QueryRunner<T: Transport> {
    transport: T,
    api_key: String,
    max_retries: usize,
}

impl<T: Transport> QueryRunner<T> {
    pub fn new(transport: T, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sends the request once. Transport failures are logged and turned
    /// into [`Attempt::NoResponse`].
    pub async fn get(&self, request: &Request) -> Attempt {
        match self.transport.send(request).await {
            Ok(response) => Attempt::Response(response),
            Err(e) => {
                error!("{}: {}", e.kind(), e.message());
                Attempt::NoResponse(e)
            }
        }
    }

    /// Re-sends `request` until an attempt succeeds or `max_retries` retries
    /// have been spent, starting from the already-made `first` attempt.
    ///
    /// Spending the whole retry budget is a failure even when the last retry
    /// happens to succeed.
    pub async fn retry(
        &self,
        first: Attempt,
        request: &Request,
    ) -> Result<QueryOutput, QueryError> {
        let url = request.display_url();
        let mut retries = 0;
        let mut outcome = classify(&first)?;

        while !outcome.is_success() && retries < self.max_retries {
            info!(
                "Retry attempt {} of {} for: {}",
                retries + 1,
                self.max_retries,
                url
            );
            let attempt = self.get(request).await;
            retries += 1;
            outcome = classify(&attempt)?;
        }

        let exhausted = self.max_retries > 0 && retries == self.max_retries;
        match outcome {
            Outcome::Success(payload) if !exhausted => {
                if retries != 0 {
                    info!("Recovered after {} attempts for: {}", retries, url);
                } else {
                    debug!("Successfully queried: {}", url);
                }
                Ok(QueryOutput { payload, retries })
            }
            last => {
                error!("Failed {} times to successfully query: {}", retries, url);
                Err(QueryError::RetryExhausted { url, retries, last })
            }
        }
    }

    /// Authenticates `request`, sends it, and retries as needed.
    #[tracing::instrument(skip(self, request))]
    pub async fn query_api(&self, request: Request) -> Result<QueryOutput, QueryError> {
        let request = self.authorize(request);
        let first = self.get(&request).await;
        self.retry(first, &request).await
    }

    fn authorize(&self, mut request: Request) -> Request {
        if request.param_value(API_KEY_PARAM).is_none() {
            request
                .params
                .insert(0, (API_KEY_PARAM.to_string(), self.api_key.clone()));
        }
        request
    }
}
