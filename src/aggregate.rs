//! Incremental aggregation: the `Aggregator` lifecycle shared by the
//! row-at-a-time strategies, and the chunked parallel strategy built on
//! `Aggregator::merge`.

use crate::concurrency::run_in_pool;
use crate::config::EngineOptions;
use crate::counting::{DateActivity, EmojiCounts, MentionCounts};
use crate::error::Result;
use crate::mem::maybe_throttle_low_memory;
use crate::progress::make_count_progress;
use crate::record::{decode_line, PostRecord};
use crate::source::{split_lines, RecordSource};
use crate::strategy::Strategy;
use crate::topk::{check_top_n, ActiveDate, Ranked};
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

/// Running state of one aggregate.
///
/// Created empty, fed records in source order, then consumed once by
/// `finish`. Nothing may be read before the input is exhausted.
pub trait Aggregator: Send + Default {
    type Output;
    fn ingest(&mut self, record: &PostRecord);
    /// Fold another partial state (built over a disjoint slice of the input) into this one.
    fn merge(&mut self, other: Self);
    fn distinct_keys(&self) -> usize;
    fn finish(self, n: usize) -> Self::Output;
}

/// What one scan saw, for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub records: u64,
    pub malformed: u64,
}

impl ScanStats {
    pub fn absorb(&mut self, other: ScanStats) {
        self.records += other.records;
        self.malformed += other.malformed;
    }

    pub fn log(&self, strategy: &str, aggregate: &str, path: &Path, distinct: usize, started: Instant) {
        tracing::debug!(
            strategy,
            aggregate,
            path = %path.display(),
            records = self.records,
            malformed = self.malformed,
            distinct,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation finished"
        );
        if self.malformed > 0 && self.malformed >= self.records {
            tracing::warn!(
                path = %path.display(),
                malformed = self.malformed,
                records = self.records,
                "at least half of the lines were not valid JSON objects and were skipped"
            );
        }
    }
}

/// Cut `bytes` into pieces of roughly `target` bytes that end on a newline.
/// Each piece carries the 1-based number of its first line.
pub fn newline_chunks(bytes: &[u8], target: usize) -> Vec<(u64, &[u8])> {
    let target = target.max(1);
    let mut pieces = Vec::new();
    let mut start = 0;
    while start < bytes.len() {
        let mut end = start.saturating_add(target).min(bytes.len());
        if end < bytes.len() {
            end = match bytes[end..].iter().position(|b| *b == b'\n') {
                Some(p) => end + p + 1,
                None => bytes.len(),
            };
        }
        pieces.push(&bytes[start..end]);
        start = end;
    }

    let newlines: Vec<u64> = pieces
        .par_iter()
        .map(|p| p.iter().filter(|b| **b == b'\n').count() as u64)
        .collect();
    let mut first_line = 1u64;
    pieces
        .into_iter()
        .zip(newlines)
        .map(|(piece, nl)| {
            let at = first_line;
            first_line += nl;
            (at, piece)
        })
        .collect()
}

/// Build one aggregator per chunk on the current rayon pool, then merge them.
pub fn aggregate_chunks_parallel<A: Aggregator>(
    bytes: &[u8],
    chunk_bytes: usize,
    pb: Option<&ProgressBar>,
) -> (A, ScanStats) {
    let chunks = newline_chunks(bytes, chunk_bytes);
    chunks
        .par_iter()
        .map(|(first_line, chunk)| {
            let mut agg = A::default();
            let mut stats = ScanStats::default();
            for (local, line) in split_lines(chunk) {
                match decode_line(line, first_line + local - 1) {
                    Ok(rec) => {
                        stats.records += 1;
                        agg.ingest(&rec);
                    }
                    Err(e) => {
                        stats.malformed += 1;
                        tracing::trace!("skipping: {}", e);
                    }
                }
            }
            if let Some(pb) = pb {
                pb.inc(1);
            }
            (agg, stats)
        })
        .reduce(
            || (A::default(), ScanStats::default()),
            |(mut a, mut sa), (b, sb)| {
                a.merge(b);
                sa.absorb(sb);
                (a, sa)
            },
        )
}

/// Bulk strategy: load the file, aggregate newline-aligned chunks in parallel
/// and merge the partial states.
#[derive(Clone, Debug, Default)]
pub struct Parallel {
    opts: EngineOptions,
}

impl Parallel {
    pub fn new(opts: EngineOptions) -> Self {
        Self { opts }
    }

    fn run<A: Aggregator>(&self, path: &Path, n: usize, aggregate: &str) -> Result<A::Output> {
        check_top_n(n)?;
        let started = Instant::now();
        let source = RecordSource::open(path, self.opts.read_buffer_bytes)?;
        let bytes = source.read_all()?;
        maybe_throttle_low_memory(0.10);

        let pb = if self.opts.progress {
            let total = bytes.len().div_ceil(self.opts.chunk_bytes.max(1)) as u64;
            Some(make_count_progress(total, self.opts.progress_label.as_deref().unwrap_or(aggregate)))
        } else {
            None
        };

        let chunk_bytes = self.opts.chunk_bytes;
        let (agg, stats) =
            run_in_pool(self.opts.parallelism, || aggregate_chunks_parallel::<A>(&bytes, chunk_bytes, pb.as_ref()))?;
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        stats.log(self.name(), aggregate, path, agg.distinct_keys(), started);
        Ok(agg.finish(n))
    }
}

impl Strategy for Parallel {
    fn name(&self) -> &'static str {
        "parallel"
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
    Parallel::default().top_active_dates(path.as_ref(), n)
}

pub fn top_emojis(path: impl AsRef<Path>, n: usize) -> Result<Vec<Ranked>> {
    Parallel::default().top_emojis(path.as_ref(), n)
}

pub fn top_mentioned_users(path: impl AsRef<Path>, n: usize) -> Result<Vec<Ranked>> {
    Parallel::default().top_mentioned_users(path.as_ref(), n)
}
