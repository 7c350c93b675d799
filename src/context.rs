//! Run bookkeeping: when querying started, when it ended, how long it took.

use chrono::Local;
use log::info;
use std::time::{Duration, Instant};

/// Format used for wall-clock times in log messages.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Created before the first request and finished exactly once, whether the
/// run completes or stops on an error. Dropping an unfinished context
/// finishes it.
#[derive(Debug)]
pub struct RunContext {
    started: Instant,
    elapsed: Option<Duration>,
}

impl RunContext {
    pub fn start() -> Self {
        info!("Started querying at: {}", Local::now().format(TIME_FORMAT));
        Self {
            started: Instant::now(),
            elapsed: None,
        }
    }

    /// Logs the end time and elapsed time. Later calls return the duration
    /// recorded by the first one without logging again.
    pub fn finish(&mut self) -> Duration {
        if let Some(elapsed) = self.elapsed {
            return elapsed;
        }

        let elapsed = self.started.elapsed();
        info!("Ended at: {}", Local::now().format(TIME_FORMAT));
        info!("Elapsed time: {:.3}s", elapsed.as_secs_f64());
        self.elapsed = Some(elapsed);
        elapsed
    }
}

impl Drop for RunContext {
    fn drop(&mut self) {
        self.finish();
    }
}
