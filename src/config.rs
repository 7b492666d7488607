use std::str::FromStr;

/// Tuning shared by every strategy, with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct EngineOptions {
    pub read_buffer_bytes: usize,     // BufReader capacity for the record source
    pub parallelism: Option<usize>,   // Some(N) to size the per-run rayon pool, None for rayon's default
    pub chunk_bytes: usize,           // target chunk size for the parallel strategy
    pub progress: bool,               // show a byte progress bar while streaming
    pub progress_label: Option<String>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            read_buffer_bytes: 256 * 1024,
            parallelism: None,
            chunk_bytes: 4 * 1024 * 1024,
            progress: false, // library default; the binary turns it on
            progress_label: None,
        }
    }
}

impl EngineOptions {
    /// Defaults overlaid with `POST_STATS_THREADS`, `POST_STATS_READ_BUFFER`,
    /// `POST_STATS_CHUNK_BYTES` and `POST_STATS_PROGRESS` when set and parsable.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if let Some(n) = env_parse::<usize>("POST_STATS_THREADS") {
            opts = opts.with_parallelism(n);
        }
        if let Some(n) = env_parse::<usize>("POST_STATS_READ_BUFFER") {
            opts = opts.with_read_buffer(n);
        }
        if let Some(n) = env_parse::<usize>("POST_STATS_CHUNK_BYTES") {
            opts = opts.with_chunk_bytes(n);
        }
        if let Ok(s) = std::env::var("POST_STATS_PROGRESS") {
            opts.progress = matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        opts
    }

    pub fn with_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = if threads == 0 { None } else { Some(threads) };
        self
    }
    pub fn with_chunk_bytes(mut self, bytes: usize) -> Self {
        self.chunk_bytes = bytes.max(64 * 1024);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("{} is set but not a valid value: {:?}", key, raw);
            None
        }
    }
}
