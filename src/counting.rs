//! Row-at-a-time reducers behind the streaming and parallel strategies:
//! per-date activity with per-author sub-counts, symbol counts, mention counts.

use crate::aggregate::Aggregator;
use crate::date::PostDate;
use crate::emoji::pictographs;
use crate::record::PostRecord;
use crate::topk::{rank_cmp, top_k, ActiveDate, Ranked};
use ahash::AHashMap;

/// Add one occurrence of `key`, allocating only the first time it is seen.
#[inline]
fn bump(map: &mut AHashMap<String, u64>, key: &str, by: u64) {
    if let Some(c) = map.get_mut(key) {
        *c += by;
    } else {
        map.insert(key.to_owned(), by);
    }
}

fn ranked(counts: AHashMap<String, u64>, n: usize) -> Vec<Ranked> {
    top_k(counts, n).into_iter().map(Ranked::from).collect()
}

/// Posts on one date, and who wrote them.
#[derive(Debug, Default, Clone)]
pub struct DateTally {
    total: u64,
    authors: AHashMap<String, u64>,
}

impl DateTally {
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn author_counts(&self) -> &AHashMap<String, u64> {
        &self.authors
    }

    /// Most prolific author; equal counts go to the smallest handle.
    pub fn top_author(&self) -> Option<(&str, u64)> {
        self.authors
            .iter()
            .min_by(|a, b| rank_cmp((a.0.as_str(), *a.1), (b.0.as_str(), *b.1)))
            .map(|(a, c)| (a.as_str(), *c))
    }
}

#[derive(Debug, Default, Clone)]
pub struct DateActivity {
    dates: AHashMap<PostDate, DateTally>,
}

impl DateActivity {
    pub fn record(&mut self, date: PostDate, author: &str) {
        let tally = self.dates.entry(date).or_default();
        tally.total += 1;
        bump(&mut tally.authors, author, 1);
    }

    pub fn tally(&self, date: PostDate) -> Option<&DateTally> {
        self.dates.get(&date)
    }

    pub fn distinct_dates(&self) -> usize {
        self.dates.len()
    }
}

impl Aggregator for DateActivity {
    type Output = Vec<ActiveDate>;

    fn ingest(&mut self, record: &PostRecord) {
        if let (Some(date), Some(author)) = (record.post_date(), record.author()) {
            self.record(date, &author);
        }
    }

    fn merge(&mut self, other: Self) {
        for (date, part) in other.dates {
            let tally = self.dates.entry(date).or_default();
            tally.total += part.total;
            for (author, c) in part.authors {
                *tally.authors.entry(author).or_insert(0) += c;
            }
        }
    }

    fn distinct_keys(&self) -> usize {
        self.dates.len()
    }

    fn finish(self, n: usize) -> Vec<ActiveDate> {
        let top = top_k(self.dates.iter().map(|(d, t)| (*d, t.total)), n);
        top.into_iter()
            .filter_map(|(date, total)| {
                let (author, _) = self.dates.get(&date)?.top_author()?;
                Some(ActiveDate { date, top_author: author.to_owned(), total })
            })
            .collect()
    }
}

#[derive(Debug, Default, Clone)]
pub struct EmojiCounts {
    counts: AHashMap<String, u64>,
}

impl EmojiCounts {
    pub fn count(&self, symbol: &str) -> u64 {
        self.counts.get(symbol).copied().unwrap_or(0)
    }
}

impl Aggregator for EmojiCounts {
    type Output = Vec<Ranked>;

    fn ingest(&mut self, record: &PostRecord) {
        if let Some(text) = record.text() {
            for symbol in pictographs(&text) {
                bump(&mut self.counts, symbol, 1);
            }
        }
    }

    fn merge(&mut self, other: Self) {
        for (k, v) in other.counts {
            *self.counts.entry(k).or_insert(0) += v;
        }
    }

    fn distinct_keys(&self) -> usize {
        self.counts.len()
    }

    fn finish(self, n: usize) -> Vec<Ranked> {
        ranked(self.counts, n)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MentionCounts {
    counts: AHashMap<String, u64>,
}

impl MentionCounts {
    pub fn count(&self, handle: &str) -> u64 {
        self.counts.get(handle).copied().unwrap_or(0)
    }
}

impl Aggregator for MentionCounts {
    type Output = Vec<Ranked>;

    fn ingest(&mut self, record: &PostRecord) {
        for handle in record.mentions() {
            *self.counts.entry(handle).or_insert(0) += 1;
        }
    }

    fn merge(&mut self, other: Self) {
        for (k, v) in other.counts {
            *self.counts.entry(k).or_insert(0) += v;
        }
    }

    fn distinct_keys(&self) -> usize {
        self.counts.len()
    }

    fn finish(self, n: usize) -> Vec<Ranked> {
        ranked(self.counts, n)
    }
}
