//! Query execution: one request, classified, retried a bounded number of
//! times.

mod classify;
mod error;
mod runner;

pub use classify::{Attempt, Outcome, classify, decode_json, status_ok};
pub use error::{QueryError, UNAUTHORIZED_MESSAGE};
pub use runner::{DEFAULT_MAX_RETRIES, QueryOutput, QueryRunner};
