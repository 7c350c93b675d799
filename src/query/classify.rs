//! Classification of a single request attempt.
//!
//! Every attempt ends up as exactly one [`Outcome`]. Only a 401 escapes the
//! classification as an error, because retrying it cannot help.

use log::{debug, error};
use serde_json::Value;
use std::fmt;

use super::error::{QueryError, UNAUTHORIZED_MESSAGE};
use crate::http::{Response, TransportError, TransportErrorKind};

/// Result of sending a request once.
#[derive(Debug)]
pub enum Attempt {
    /// An HTTP response arrived, whatever its status.
    Response(Response),
    /// Nothing came back.
    NoResponse(TransportError),
}

/// What an attempt amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    TransportError(TransportErrorKind),
    StatusError(u16),
    DecodeError,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(_) => write!(f, "success"),
            Outcome::TransportError(kind) => write!(f, "no response ({})", kind),
            Outcome::StatusError(status) => write!(f, "status code {}", status),
            Outcome::DecodeError => write!(f, "invalid JSON body"),
        }
    }
}

/// Parses the response body as JSON, or `None` if it isn't.
pub fn decode_json(response: &Response) -> Option<Value> {
    match serde_json::from_str(&response.body) {
        Ok(value) => Some(value),
        Err(e) => {
            error!("Failed to decode JSON for: {}", response.display_url());
            debug!("JSON error: {}", e);
            None
        }
    }
}

/// `Ok(true)` for 2xx, `Ok(false)` for any other status worth retrying,
/// and [`QueryError::Unauthorized`] for 401.
pub fn status_ok(response: &Response) -> Result<bool, QueryError> {
    if response.status == 401 {
        error!("{}", UNAUTHORIZED_MESSAGE);
        log_body(response);
        return Err(QueryError::Unauthorized);
    }

    if !response.is_success() {
        error!(
            "Received status code {} for: {}",
            response.status,
            response.display_url()
        );
        log_body(response);
        return Ok(false);
    }

    Ok(true)
}

/// Folds one attempt into an [`Outcome`].
pub fn classify(attempt: &Attempt) -> Result<Outcome, QueryError> {
    let response = match attempt {
        Attempt::Response(response) => response,
        Attempt::NoResponse(e) => return Ok(Outcome::TransportError(e.kind())),
    };

    if !status_ok(response)? {
        return Ok(Outcome::StatusError(response.status));
    }

    Ok(match decode_json(response) {
        Some(payload) => Outcome::Success(payload),
        None => Outcome::DecodeError,
    })
}

fn log_body(response: &Response) {
    if !response.body.is_empty() {
        debug!("Server response: {}", response.body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> Response {
        Response {
            url: "https://example.com/api/v2/search/submissions?api_key=k&q=x".to_string(),
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_ok_accepts_every_2xx() {
        for status in 200..300 {
            assert!(
                matches!(status_ok(&response(status, "")), Ok(true)),
                "status {} should be ok",
                status
            );
        }
    }

    #[test]
    fn test_status_ok_rejects_other_statuses_without_failing() {
        for status in (100..200).chain(300..401).chain(402..600) {
            assert!(
                matches!(status_ok(&response(status, "nope")), Ok(false)),
                "status {} should be a recoverable failure",
                status
            );
        }
    }

    #[test]
    fn test_status_ok_401_is_fatal() {
        let result = status_ok(&response(401, r#"{"error": "bad key"}"#));
        assert!(matches!(result, Err(QueryError::Unauthorized)));
    }

    #[test]
    fn test_decode_json_valid_body() {
        let decoded = decode_json(&response(200, r#"{"data": {"items": []}}"#));
        assert_eq!(decoded, Some(json!({"data": {"items": []}})));
    }

    #[test]
    fn test_decode_json_malformed_bodies() {
        for body in [r#"{"data": {"items": ["#, "<html>oops</html>", "", "\u{0}\u{1}"] {
            assert_eq!(decode_json(&response(200, body)), None, "body {:?}", body);
        }
    }

    #[test]
    fn test_classify_no_response() {
        let attempt = Attempt::NoResponse(TransportError::new(
            TransportErrorKind::Timeout,
            "timed out",
        ));
        assert_eq!(
            classify(&attempt).unwrap(),
            Outcome::TransportError(TransportErrorKind::Timeout)
        );
    }

    #[test]
    fn test_classify_status_error_skips_decoding() {
        let attempt = Attempt::Response(response(500, r#"{"valid": "json"}"#));
        assert_eq!(classify(&attempt).unwrap(), Outcome::StatusError(500));
    }

    #[test]
    fn test_classify_decode_error() {
        let attempt = Attempt::Response(response(200, "not json"));
        assert_eq!(classify(&attempt).unwrap(), Outcome::DecodeError);
    }

    #[test]
    fn test_classify_success() {
        let attempt = Attempt::Response(response(204, "[1, 2]"));
        assert_eq!(classify(&attempt).unwrap(), Outcome::Success(json!([1, 2])));
    }

    #[test]
    fn test_classify_unauthorized() {
        let attempt = Attempt::Response(response(401, ""));
        assert!(matches!(classify(&attempt), Err(QueryError::Unauthorized)));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::StatusError(502).to_string(), "status code 502");
        assert_eq!(Outcome::DecodeError.to_string(), "invalid JSON body");
        assert_eq!(
            Outcome::TransportError(TransportErrorKind::Connect).to_string(),
            "no response (ConnectionError)"
        );
    }
}
