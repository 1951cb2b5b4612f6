//! Deadline-bound execution of a planning job.

use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Run `job` on tokio's blocking pool and wait at most `deadline` for it.
///
/// On expiry the runtime is shut down without joining the worker, so the
/// caller gets control back at the deadline. The abandoned job keeps no
/// state outside its return value.
pub fn run_with_deadline<T, F>(deadline: Duration, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the planning runtime")?;

    let outcome = runtime.block_on(async {
        let task = tokio::task::spawn_blocking(job);
        tokio::time::timeout(deadline, task).await
    });

    match outcome {
        Ok(joined) => joined.context("planning task panicked"),
        Err(_) => {
            runtime.shutdown_background();
            bail!(
                "planning did not finish within {:.1}s",
                deadline.as_secs_f64()
            )
        }
    }
}
