use super::classify::Outcome;

/// Message shown to the operator when the API rejects the key.
pub const UNAUTHORIZED_MESSAGE: &str =
    "The server returned 401 unauthorized. Check your API key.";

/// Failures that survive the retry loop.
#[derive(Debug)]
pub enum QueryError {
    /// HTTP 401. Never retried.
    Unauthorized,
    /// The retry budget ran out.
    RetryExhausted {
        /// Redacted request URL.
        url: String,
        /// Retries spent after the first attempt.
        retries: usize,
        /// Classification of the final attempt.
        last: Outcome,
    },
}

impl QueryError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, QueryError::Unauthorized)
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::Unauthorized => f.write_str(UNAUTHORIZED_MESSAGE),
            QueryError::RetryExhausted {
                url,
                retries,
                last,
            } => {
                write!(
                    f,
                    "Failed {} times to successfully query: {} (last attempt: {})",
                    retries, url, last
                )
            }
        }
    }
}

impl std::error::Error for QueryError {}
