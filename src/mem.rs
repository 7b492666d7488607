//! Memory sampling used by the bulk strategies and the CLI report.

use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};
use sysinfo::{ProcessExt, System, SystemExt};

/// Shared sysinfo handle with a cached available/total ratio.
struct Sampler {
    sys: System,
    sampled_at: Instant,
    free_ratio: f64,
}

static SAMPLER: OnceLock<Mutex<Sampler>> = OnceLock::new();
const RESAMPLE_AFTER: Duration = Duration::from_millis(500);

fn with_sampler<T>(f: impl FnOnce(&mut Sampler) -> T) -> T {
    let sampler = SAMPLER.get_or_init(|| {
        Mutex::new(Sampler {
            sys: System::new(),
            sampled_at: Instant::now() - RESAMPLE_AFTER * 2,
            free_ratio: 1.0,
        })
    });
    let mut guard = sampler.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

/// Fraction of physical memory currently available, resampled at most every 500ms.
pub fn available_memory_fraction() -> f64 {
    with_sampler(|p| {
        if p.sampled_at.elapsed() >= RESAMPLE_AFTER {
            p.sys.refresh_memory();
            let total = p.sys.total_memory() as f64;
            p.free_ratio = if total > 0.0 { (p.sys.available_memory() as f64 / total).clamp(0.0, 1.0) } else { 1.0 };
            p.sampled_at = Instant::now();
        }
        p.free_ratio
    })
}

/// Called before a whole file is pulled into memory. Waits briefly while less
/// than `threshold` of RAM is free so other runs can release theirs.
pub fn maybe_throttle_low_memory(threshold: f64) {
    for _ in 0..4 {
        if available_memory_fraction() >= threshold {
            return;
        }
        tracing::debug!(threshold, "memory is short, delaying bulk load");
        std::thread::sleep(RESAMPLE_AFTER);
    }
}

/// Resident set size of this process in bytes, if the platform reports it.
pub fn resident_bytes() -> Option<u64> {
    let pid = sysinfo::get_current_pid().ok()?;
    with_sampler(|p| {
        if !p.sys.refresh_process(pid) {
            return None;
        }
        p.sys.process(pid).map(|proc_| proc_.memory())
    })
}
