use crate::config::EngineOptions;
use crate::error::Result;
use crate::strategy::{Strategy, StrategyKind};
use crate::topk::{ActiveDate, Ranked};
use std::path::Path;

/// Builder front door: pick a strategy by configuration, tune it, and run any
/// of the three aggregates. Holds no state between runs.
#[derive(Clone, Debug, Default)]
pub struct PostStats {
    kind: StrategyKind,
    opts: EngineOptions,
}

impl PostStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from `POST_STATS_*` environment variables.
    pub fn from_env() -> Self {
        Self { kind: StrategyKind::default(), opts: EngineOptions::from_env() }
    }

    // -------- Builder methods --------
    pub fn strategy(mut self, kind: StrategyKind) -> Self { self.kind = kind; self }
    pub fn options(mut self, opts: EngineOptions) -> Self { self.opts = opts; self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_read_buffer(bytes); self }
    pub fn chunk_bytes(mut self, bytes: usize) -> Self { self.opts = self.opts.with_chunk_bytes(bytes); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn engine_options(&self) -> &EngineOptions {
        &self.opts
    }

    pub fn build(&self) -> Box<dyn Strategy> {
        self.kind.build(self.opts.clone())
    }

    // -------- Aggregates --------

    pub fn top_active_dates(&self, path: impl AsRef<Path>, n: usize) -> Result<Vec<ActiveDate>> {
        self.build().top_active_dates(path.as_ref(), n)
    }

    pub fn top_emojis(&self, path: impl AsRef<Path>, n: usize) -> Result<Vec<Ranked>> {
        self.build().top_emojis(path.as_ref(), n)
    }

    pub fn top_mentioned_users(&self, path: impl AsRef<Path>, n: usize) -> Result<Vec<Ranked>> {
        self.build().top_mentioned_users(path.as_ref(), n)
    }
}
