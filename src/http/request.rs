//! Plain-data request and response values exchanged with a [`Transport`].
//!
//! The query logic builds [`Request`] values and inspects [`Response`] values
//! without knowing how they travel over the network.
//!
//! [`Transport`]: super::Transport

use reqwest::Url;

/// Query parameter carrying the API credential.
pub const API_KEY_PARAM: &str = "api_key";

const REDACTED: &str = "***";

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
        }
    }

    /// Appends a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    /// Returns the value of the first parameter called `name`.
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Full URL with the query string attached and the API key redacted.
    /// Safe to put in logs and error messages.
    pub fn display_url(&self) -> String {
        if self.params.is_empty() {
            return redact_url(&self.url);
        }
        match Url::parse_with_params(&self.url, &self.params) {
            Ok(url) => redact_url(url.as_str()),
            Err(_) => self.url.clone(),
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Final URL the response came from.
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The response URL with the API key redacted.
    pub fn display_url(&self) -> String {
        redact_url(&self.url)
    }
}

/// Replaces the value of the `api_key` query parameter with `***`.
/// Strings that don't parse as URLs are returned unchanged.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    if !url.query_pairs().any(|(key, _)| key == API_KEY_PARAM) {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if key == API_KEY_PARAM {
                REDACTED.to_string()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();

    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}
