//! HTTP boundary: plain-data requests/responses and the transport that
//! carries them.

mod request;
mod transport;

pub use request::{API_KEY_PARAM, Request, Response, redact_url};
#[cfg(test)]
pub use transport::MockTransport;
pub use transport::{ReqwestTransport, Transport, TransportError, TransportErrorKind};
