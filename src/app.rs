//! Top-level run: paginate through a search and print every sample.

use anyhow::{Context, Result};
use futures_util::TryStreamExt;
use log::info;
use std::io::Write;
use std::pin::pin;

use crate::context::RunContext;
use crate::http::Transport;
use crate::query::QueryRunner;
use crate::search::SearchPager;

/// What to search for and where.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Base URL of the API, e.g. `https://search.example.com`.
    pub base_url: String,
    /// Search term sent as `q`.
    pub query: String,
    /// Requested page size.
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub items: usize,
}

/// Prints the `sample` of every search result to `out`, one per line.
///
/// The run context is finished before returning on every path, including a
/// rejected API key.
#[tracing::instrument(skip(runner, out))]
pub async fn run<T: Transport, W: Write>(
    runner: &QueryRunner<T>,
    options: &RunOptions,
    out: &mut W,
) -> Result<RunSummary> {
    let mut context = RunContext::start();
    let result = print_samples(runner, options, out).await;
    context.finish();

    let summary = result?;
    info!("Printed {} samples for query {:?}", summary.items, options.query);
    Ok(summary)
}

async fn print_samples<T: Transport, W: Write>(
    runner: &QueryRunner<T>,
    options: &RunOptions,
    out: &mut W,
) -> Result<RunSummary> {
    let pager = SearchPager::new(runner, &options.base_url, &options.query, options.limit);
    let mut samples = pin!(pager.into_samples());
    let mut items = 0;

    while let Some(sample) = samples.try_next().await? {
        writeln!(out, "{}", sample).context("Failed to write sample")?;
        items += 1;
    }

    out.flush().context("Failed to flush output")?;
    Ok(RunSummary { items })
}
