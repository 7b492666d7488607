//! Streaming strategy: one pass, one record resident at a time. Memory is
//! bounded by the number of distinct keys, not by the size of the input.

use crate::aggregate::{Aggregator, ScanStats};
use crate::config::EngineOptions;
use crate::counting::{DateActivity, EmojiCounts, MentionCounts};
use crate::error::Result;
use crate::progress::make_progress_bar_labeled;
use crate::source::RecordSource;
use crate::strategy::Strategy;
use crate::topk::{check_top_n, ActiveDate, Ranked};
use std::path::Path;
use std::time::Instant;

#[derive(Clone, Debug, Default)]
pub struct Streaming {
    opts: EngineOptions,
}

impl Streaming {
    pub fn new(opts: EngineOptions) -> Self {
        Self { opts }
    }

    /// Drive `agg` over every record of `source`, absorbing malformed lines.
    pub fn scan<A: Aggregator>(&self, source: &RecordSource, agg: &mut A) -> Result<ScanStats> {
        let pb = if self.opts.progress {
            Some(make_progress_bar_labeled(source.len_bytes(), self.opts.progress_label.as_deref()))
        } else {
            None
        };

        let mut stats = ScanStats::default();
        let mut records = source.records()?;
        let mut last = 0u64;
        while let Some(item) = records.next() {
            match item {
                Ok(rec) => {
                    stats.records += 1;
                    agg.ingest(&rec);
                }
                Err(e) if e.is_recoverable() => {
                    stats.malformed += 1;
                    tracing::trace!("skipping: {}", e);
                }
                Err(e) => return Err(e),
            }
            if let Some(pb) = &pb {
                let cur = records.bytes_read();
                if cur > last {
                    pb.inc(cur - last);
                    last = cur;
                }
            }
        }
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        Ok(stats)
    }

    fn run<A: Aggregator>(&self, path: &Path, n: usize, aggregate: &str) -> Result<A::Output> {
        check_top_n(n)?;
        let started = Instant::now();
        let source = RecordSource::open(path, self.opts.read_buffer_bytes)?;
        let mut agg = A::default();
        let stats = self.scan(&source, &mut agg)?;
        stats.log(self.name(), aggregate, path, agg.distinct_keys(), started);
        Ok(agg.finish(n))
    }
}

impl Strategy for Streaming {
    fn name(&self) -> &'static str {
        "streaming"
    }
    fn top_active_dates(&self, path: &Path, n: usize) -> Result<Vec<ActiveDate>> {
        self.run::<DateActivity>(path, n, "top_active_dates")
    }
    fn top_emojis(&self, path: &Path, n: usize) -> Result<Vec<Ranked>> {
        self.run::<EmojiCounts>(path, n, "top_emojis")
    }
    fn top_mentioned_users(&self, path: &Path, n: usize) -> Result<Vec<Ranked>> {
        self.run::<MentionCounts>(path, n, "top_mentioned_users")
    }
}

pub fn top_active_dates(path: impl AsRef<Path>, n: usize) -> Result<Vec<ActiveDate>> {
    Streaming::default().top_active_dates(path.as_ref(), n)
}

pub fn top_emojis(path: impl AsRef<Path>, n: usize) -> Result<Vec<Ranked>> {
    Streaming::default().top_emojis(path.as_ref(), n)
}

pub fn top_mentioned_users(path: impl AsRef<Path>, n: usize) -> Result<Vec<Ranked>> {
    Streaming::default().top_mentioned_users(path.as_ref(), n)
}
