use crate::aggregate::Parallel;
use crate::columnar::Columnar;
use crate::config::EngineOptions;
use crate::error::Result;
use crate::streaming::Streaming;
use crate::topk::{ActiveDate, Ranked};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// One way of computing the three aggregates. Every implementation returns
/// identical rankings for identical input; they differ only in memory and
/// throughput.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// The `n` busiest dates, each with its most prolific author.
    fn top_active_dates(&self, path: &Path, n: usize) -> Result<Vec<ActiveDate>>;

    /// The `n` most frequent pictographic symbols in post text.
    fn top_emojis(&self, path: &Path, n: usize) -> Result<Vec<Ranked>>;

    /// The `n` most mentioned handles.
    fn top_mentioned_users(&self, path: &Path, n: usize) -> Result<Vec<Ranked>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum StrategyKind {
    #[default]
    Streaming,
    Columnar,
    Parallel,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [StrategyKind::Streaming, StrategyKind::Columnar, StrategyKind::Parallel];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Streaming => "streaming",
            StrategyKind::Columnar => "columnar",
            StrategyKind::Parallel => "parallel",
        }
    }

    pub fn build(self, opts: EngineOptions) -> Box<dyn Strategy> {
        match self {
            StrategyKind::Streaming => Box::new(Streaming::new(opts)),
            StrategyKind::Columnar => Box::new(Columnar::new(opts)),
            StrategyKind::Parallel => Box::new(Parallel::new(opts)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "streaming" | "stream" => Ok(StrategyKind::Streaming),
            "columnar" | "bulk" => Ok(StrategyKind::Columnar),
            "parallel" | "chunked" => Ok(StrategyKind::Parallel),
            other => Err(format!("unknown strategy {other:?} (expected streaming, columnar or parallel)")),
        }
    }
}
