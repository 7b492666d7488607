//! Concurrency helper: confine a bulk computation to its own rayon pool.

use crate::error::Result;

/// Run `f` on a dedicated pool of `threads` workers (rayon's default size
/// when `None`). The caller blocks until `f` returns, so parallel runs never
/// share a pool or leak work into each other.
pub fn run_in_pool<R, F>(threads: Option<usize>, f: F) -> Result<R>
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("post-stats-{i}"));
    if let Some(n) = threads.filter(|n| *n > 0) {
        builder = builder.num_threads(n);
    }
    let pool = builder.build()?;
    Ok(pool.install(f))
}
