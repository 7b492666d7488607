//! Columnar strategy: load the file once, project only the columns an
//! aggregate needs, then compute it set-at-a-time (parallel sort + run-length
//! grouping, list explode, per-row symbol extraction, sort-then-slice).
//!
//! Rows that fail to decode become null rows in every column, so the skip set
//! matches the row-at-a-time strategies exactly.

use crate::aggregate::ScanStats;
use crate::concurrency::run_in_pool;
use crate::config::EngineOptions;
use crate::date::PostDate;
use crate::emoji::pictographs;
use crate::error::Result;
use crate::mem::maybe_throttle_low_memory;
use crate::record::{decode_line, PostRecord};
use crate::source::{split_lines, RecordSource};
use crate::strategy::Strategy;
use crate::topk::{check_top_n, rank_cmp, sort_then_slice, ActiveDate, Ranked};
use rayon::prelude::*;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// `date` and `author` columns, one slot per input row.
#[derive(Debug, Default)]
pub struct DateAuthorColumns {
    pub date: Vec<Option<PostDate>>,
    pub author: Vec<Option<String>>,
}

/// `content` column.
#[derive(Debug, Default)]
pub struct TextColumn {
    pub content: Vec<Option<String>>,
}

/// A list column: row `i` owns `values[offsets[i]..offsets[i + 1]]`.
#[derive(Debug)]
pub struct ListColumn {
    pub offsets: Vec<usize>,
    pub values: Vec<String>,
}

impl Default for ListColumn {
    fn default() -> Self {
        Self { offsets: vec![0], values: Vec::new() }
    }
}

impl ListColumn {
    pub fn rows(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn row(&self, i: usize) -> &[String] {
        &self.values[self.offsets[i]..self.offsets[i + 1]]
    }

    /// One element per list entry, across all rows.
    pub fn explode(&self) -> impl ParallelIterator<Item = &str> {
        self.values.par_iter().map(String::as_str)
    }
}

/// Decode every line in parallel and project it to a row; only the fields
/// `to_row` touches are parsed. Undecodable lines map to `null_row`.
fn project<R, F>(lines: &[(u64, &[u8])], stats: &mut ScanStats, null_row: R, to_row: F) -> Vec<R>
where
    R: Send + Clone + Sync,
    F: Fn(PostRecord) -> R + Sync,
{
    let malformed = AtomicU64::new(0);
    let rows = lines
        .par_iter()
        .map(|(no, line)| match decode_line(line, *no) {
            Ok(t) => to_row(t),
            Err(e) => {
                malformed.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("skipping: {}", e);
                null_row.clone()
            }
        })
        .collect::<Vec<_>>();
    let malformed = malformed.into_inner();
    stats.records += lines.len() as u64 - malformed;
    stats.malformed += malformed;
    rows
}

pub fn load_date_author(lines: &[(u64, &[u8])], stats: &mut ScanStats) -> DateAuthorColumns {
    let rows = project(lines, stats, (None, None), |r| (r.post_date(), r.author()));
    let (date, author): (Vec<_>, Vec<_>) = rows.into_par_iter().unzip();
    DateAuthorColumns { date, author }
}

pub fn load_text(lines: &[(u64, &[u8])], stats: &mut ScanStats) -> TextColumn {
    TextColumn { content: project(lines, stats, None, |r| r.text()) }
}

pub fn load_mentions(lines: &[(u64, &[u8])], stats: &mut ScanStats) -> ListColumn {
    let rows: Vec<Vec<String>> = project(lines, stats, Vec::new(), |r| r.mentions());
    let mut col = ListColumn { offsets: Vec::with_capacity(rows.len() + 1), values: Vec::new() };
    col.offsets.push(0);
    for row in rows {
        col.values.extend(row);
        col.offsets.push(col.values.len());
    }
    col
}

/// Group equal keys: parallel sort, then one run-length pass.
/// Output is in ascending key order.
pub fn group_count<K: Ord + Send>(mut keys: Vec<K>) -> Vec<(K, u64)> {
    keys.par_sort_unstable();
    let mut groups: Vec<(K, u64)> = Vec::new();
    for k in keys {
        match groups.last_mut() {
            Some((last, c)) if *last == k => *c += 1,
            _ => groups.push((k, 1)),
        }
    }
    groups
}

/// One entry per date: `((date, top author), total)`, in date order.
pub fn date_groups(cols: &DateAuthorColumns) -> Vec<((PostDate, &str), u64)> {
    let pairs: Vec<(PostDate, &str)> = cols
        .date
        .par_iter()
        .zip(cols.author.par_iter())
        .filter_map(|(d, a)| Some(((*d)?, a.as_deref()?)))
        .collect();

    // Sorted by (date, author): each date is one contiguous run of author groups.
    let by_author = group_count(pairs);
    let mut per_date = Vec::new();
    let mut i = 0;
    while i < by_author.len() {
        let date = by_author[i].0 .0;
        let run_end = by_author[i..]
            .iter()
            .position(|((d, _), _)| *d != date)
            .map_or(by_author.len(), |p| i + p);
        let run = &by_author[i..run_end];
        let total: u64 = run.iter().map(|(_, c)| c).sum();
        if let Some(((_, author), _)) = run.iter().min_by(|a, b| rank_cmp((a.0 .1, a.1), (b.0 .1, b.1))) {
            per_date.push(((date, *author), total));
        }
        i = run_end;
    }
    per_date
}

pub fn symbol_groups(col: &TextColumn) -> Vec<(&str, u64)> {
    let symbols: Vec<&str> = col.content.par_iter().flatten().flat_map_iter(|text| pictographs(text)).collect();
    group_count(symbols)
}

pub fn mention_groups(col: &ListColumn) -> Vec<(&str, u64)> {
    group_count(col.explode().collect())
}

pub fn rank_active_dates(groups: Vec<((PostDate, &str), u64)>, n: usize) -> Vec<ActiveDate> {
    // Dates are unique, so ordering on (date, author) ties exactly like ordering on date.
    sort_then_slice(groups, n)
        .into_iter()
        .map(|((date, author), total)| ActiveDate { date, top_author: author.to_owned(), total })
        .collect()
}

pub fn rank_keys(groups: Vec<(&str, u64)>, n: usize) -> Vec<Ranked> {
    sort_then_slice(groups, n).into_iter().map(|(k, c)| Ranked::new(k, c)).collect()
}

#[derive(Clone, Debug, Default)]
pub struct Columnar {
    opts: EngineOptions,
}

impl Columnar {
    pub fn new(opts: EngineOptions) -> Self {
        Self { opts }
    }

    /// Load the payload, then run `compute` over its lines on this run's pool.
    fn run<R, F>(&self, path: &Path, n: usize, aggregate: &str, compute: F) -> Result<R>
    where
        R: Send,
        F: FnOnce(&[(u64, &[u8])], &mut ScanStats) -> (R, usize) + Send,
    {
        check_top_n(n)?;
        let started = Instant::now();
        let source = RecordSource::open(path, self.opts.read_buffer_bytes)?;
        let bytes = source.read_all()?;
        maybe_throttle_low_memory(0.10);

        let (out, stats, distinct) = run_in_pool(self.opts.parallelism, || {
            let lines = split_lines(&bytes);
            let mut stats = ScanStats::default();
            let (out, distinct) = compute(&lines, &mut stats);
            (out, stats, distinct)
        })?;
        stats.log(self.name(), aggregate, path, distinct, started);
        Ok(out)
    }
}

impl Strategy for Columnar {
    fn name(&self) -> &'static str {
        "columnar"
    }

    fn top_active_dates(&self, path: &Path, n: usize) -> Result<Vec<ActiveDate>> {
        self.run(path, n, "top_active_dates", |lines, stats| {
            let cols = load_date_author(lines, stats);
            let groups = date_groups(&cols);
            let distinct = groups.len();
            (rank_active_dates(groups, n), distinct)
        })
    }

    fn top_emojis(&self, path: &Path, n: usize) -> Result<Vec<Ranked>> {
        self.run(path, n, "top_emojis", |lines, stats| {
            let col = load_text(lines, stats);
            let groups = symbol_groups(&col);
            let distinct = groups.len();
            (rank_keys(groups, n), distinct)
        })
    }

    fn top_mentioned_users(&self, path: &Path, n: usize) -> Result<Vec<Ranked>> {
        self.run(path, n, "top_mentioned_users", |lines, stats| {
            let col = load_mentions(lines, stats);
            tracing::trace!(rows = col.rows(), values = col.values.len(), "mention list column loaded");
            let groups = mention_groups(&col);
            let distinct = groups.len();
            (rank_keys(groups, n), distinct)
        })
    }
}

pub fn top_active_dates(path: impl AsRef<Path>, n: usize) -> Result<Vec<ActiveDate>> {
    Columnar::default().top_active_dates(path.as_ref(), n)
}

pub fn top_emojis(path: impl AsRef<Path>, n: usize) -> Result<Vec<Ranked>> {
    Columnar::default().top_emojis(path.as_ref(), n)
}

pub fn top_mentioned_users(path: impl AsRef<Path>, n: usize) -> Result<Vec<Ranked>> {
    Columnar::default().top_mentioned_users(path.as_ref(), n)
}
