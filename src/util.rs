use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Once;
use std::time::Duration;

static TRACING: Once = Once::new();

/// Install the stderr `fmt` subscriber. `RUST_LOG` overrides the `info` default.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing_once() {
    TRACING.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
    });
}

/// Open failures worth retrying: antivirus and backup filter drivers or
/// removable volumes briefly holding the file. Windows only; elsewhere every
/// open error is final.
#[cfg(windows)]
pub(crate) fn is_transient_open_error(e: &io::Error) -> bool {
    // access denied, sharing and lock violations, device not ready,
    // volume externally altered, I/O device error
    matches!(e.raw_os_error(), Some(5 | 32 | 33 | 21 | 1006 | 1117))
}

#[cfg(not(windows))]
pub(crate) fn is_transient_open_error(_: &io::Error) -> bool {
    false
}

/// Open `path`, retrying transient sharing errors with linear backoff.
/// Any other error is returned immediately.
pub fn open_with_backoff(path: &Path, attempts: usize, step_ms: u64) -> io::Result<File> {
    let mut attempt = 1u64;
    loop {
        match File::open(path) {
            Ok(f) => return Ok(f),
            Err(e) => {
                if !is_transient_open_error(&e) || attempt >= attempts.max(1) as u64 {
                    return Err(e);
                }
                tracing::debug!(path = %path.display(), attempt, "open failed transiently: {}", e);
                std::thread::sleep(Duration::from_millis(step_ms.saturating_mul(attempt)));
                attempt += 1;
            }
        }
    }
}
