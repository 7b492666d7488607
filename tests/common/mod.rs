#![allow(dead_code)]

use post_stats::{ActiveDate, EngineOptions, PostStats, Ranked, StrategyKind};
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write NDJSON rows (one `Value` per line) and return the path.
pub fn write_ndjson(dir: &Path, name: &str, rows: &[Value]) -> PathBuf {
    let lines: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
    write_lines(dir, name, &lines)
}

/// Write raw lines verbatim, each followed by `\n`.
pub fn write_lines(dir: &Path, name: &str, lines: &[String]) -> PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    for l in lines {
        writeln!(f, "{}", l).unwrap();
    }
    path
}

/// Write a compressed `.zst` file containing the provided JSONL lines.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// One post in the corpus shape.
pub fn post(date: &str, user: &str, content: &str, mentions: &[&str]) -> Value {
    json!({
        "date": date,
        "user": {"username": user},
        "content": content,
        "mentionedUsers": mentions.iter().map(|m| json!({"username": m})).collect::<Vec<_>>(),
    })
}

/// Three posts over two days:
/// - 2024-03-20: user1 ("Hello 👋 World 🌍", mentions user2+user3), user2 ("Test 🎉", mentions user1)
/// - 2024-03-21: user1 ("Another day 🌞", mentions user2)
pub fn sample_rows() -> Vec<Value> {
    vec![
        post("2024-03-20T10:00:00+0000", "user1", "Hello 👋 World 🌍", &["user2", "user3"]),
        post("2024-03-20T11:00:00+0000", "user2", "Test 🎉", &["user1"]),
        post("2024-03-21T10:00:00+0000", "user1", "Another day 🌞", &["user2"]),
    ]
}

/// A record with every field null, and one with null content and no mentions.
pub fn rows_with_nulls() -> Vec<Value> {
    vec![
        json!({"date": null, "user": null, "content": "Test without date and user", "mentionedUsers": null}),
        json!({"date": "2024-03-20T10:00:00+0000", "user": {"username": "user1"}, "content": null, "mentionedUsers": []}),
    ]
}

/// Wrong types and impossible values in every field:
/// - impossible date, user that is a string, null username
/// - null content/mentions, mentions that is a string
/// - one fully valid record
pub fn rows_malformed() -> Vec<Value> {
    vec![
        json!({"date": "2024-99-99T00:00:00+0000", "user": {"username": "evil"}, "content": "Bad date 💥", "mentionedUsers": [{"username": "x"}]}),
        json!({"date": "2024-03-22T10:00:00+0000", "user": "not_a_dict", "content": "Wrong user 🤖", "mentionedUsers": [{"username": "y"}]}),
        json!({"date": "2024-03-22T11:00:00+0000", "user": {"username": null}, "content": "Null username 🙈", "mentionedUsers": [{"username": "z"}]}),
        json!({"date": "2024-03-23T08:00:00+0000", "user": {"username": "user_ok"}, "content": null, "mentionedUsers": null}),
        json!({"date": "2024-03-23T09:00:00+0000", "user": {"username": "user_ok"}, "content": "Mention anomaly 😺", "mentionedUsers": "not_a_list"}),
        json!({"date": "2024-03-23T10:00:00+0000", "user": {"username": "valid_user"}, "content": "All good 😺😺", "mentionedUsers": [{"username": "valid_user"}]}),
    ]
}

pub fn rows_no_emoji() -> Vec<Value> {
    vec![post("2024-03-20T10:00:00+0000", "user1", "No emoji here", &[])]
}

/// One configured engine per strategy, progress off.
pub fn engines() -> Vec<PostStats> {
    StrategyKind::ALL
        .iter()
        .map(|k| PostStats::new().strategy(*k).parallelism(2).progress(false))
        .collect()
}

/// Parallel engine with the smallest chunk size, so moderately sized inputs span many chunks.
pub fn small_chunk_engine() -> PostStats {
    PostStats::new()
        .strategy(StrategyKind::Parallel)
        .options(EngineOptions::default().with_chunk_bytes(0).with_parallelism(4))
}

pub fn pairs(ranked: &[Ranked]) -> Vec<(String, u64)> {
    ranked.iter().map(|r| (r.key.clone(), r.count)).collect()
}

pub fn date_authors(dates: &[ActiveDate]) -> Vec<(String, String)> {
    dates.iter().map(|d| (d.date.to_string(), d.top_author.clone())).collect()
}

pub fn owned(v: &[(&str, u64)]) -> Vec<(String, u64)> {
    v.iter().map(|(k, c)| (k.to_string(), *c)).collect()
}
