// Runtime plumbing.
mod concurrency;
mod config;
mod error;
mod mem;
mod progress;
mod util;

// Input records and their fields.
mod date;
mod emoji;
mod record;
mod source;

// Counting, ranking and the builder.
mod counting;
mod pipeline;
mod topk;

// Strategies.
pub mod aggregate;
pub mod columnar;
pub mod streaming;
pub mod strategy;

pub use crate::config::EngineOptions;
pub use crate::date::PostDate;
pub use crate::error::{EngineError, Result};
pub use crate::pipeline::PostStats;
pub use crate::strategy::{Strategy, StrategyKind};

// Strategy implementations and the incremental aggregation model.
pub use crate::aggregate::{Aggregator, Parallel, ScanStats};
pub use crate::columnar::Columnar;
pub use crate::streaming::Streaming;
pub use crate::counting::{DateActivity, DateTally, EmojiCounts, MentionCounts};

// Ranking and result types.
pub use crate::topk::{check_top_n, rank_cmp, sort_then_slice, top_k, ActiveDate, Ranked, TopK};

// Record source, schema and extractors.
pub use crate::record::{author_of, handle_of, mentions_of, post_date_of, text_of, PostRecord};
pub use crate::source::{RecordSource, Records};
pub use crate::emoji::{is_pictographic, pictographs};

// Ambient helpers for binaries.
pub use crate::mem::{available_memory_fraction, resident_bytes};
pub use crate::util::init_tracing_once;
