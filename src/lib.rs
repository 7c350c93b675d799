pub mod app;
pub mod config;
pub mod context;
pub mod http;
pub mod logging;
pub mod query;
pub mod runtime;
pub mod search;
