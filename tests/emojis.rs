#[path = "common/mod.rs"]
mod common;

use common::*;
use post_stats::{is_pictographic, pictographs};
use serde_json::json;

/// Post texts "🙏 good", "🙏🙏", "😂": N=2 gives 🙏 three times, then 😂 once.
#[test]
fn repeated_symbols_count_per_occurrence() {
    let dir = tempfile::tempdir().unwrap();
    let rows = vec![
        post("2021-02-12T08:00:00+0000", "a", "🙏 good", &[]),
        post("2021-02-12T09:00:00+0000", "b", "🙏🙏", &[]),
        post("2021-02-13T09:00:00+0000", "c", "😂", &[]),
    ];
    let path = write_ndjson(dir.path(), "pray.ndjson", &rows);

    for engine in engines() {
        assert_eq!(pairs(&engine.top_emojis(&path, 2).unwrap()), owned(&[("🙏", 3), ("😂", 1)]), "strategy {}", engine.kind());
    }
}

/// Four symbols once each: ties fall back to code point order, and N caps the length.
#[test]
fn ties_break_by_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_ndjson(dir.path(), "sample.ndjson", &sample_rows());

    for engine in engines() {
        assert_eq!(pairs(&engine.top_emojis(&path, 3).unwrap()), owned(&[("🌍", 1), ("🌞", 1), ("🎉", 1)]));
        assert_eq!(engine.top_emojis(&path, 1).unwrap().len(), 1);
        assert_eq!(engine.top_emojis(&path, 100).unwrap().len(), 4);
    }
}

#[test]
fn no_symbols_gives_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let none = write_ndjson(dir.path(), "none.ndjson", &rows_no_emoji());
    let nulls = write_ndjson(dir.path(), "nulls.ndjson", &rows_with_nulls());

    for engine in engines() {
        assert!(engine.top_emojis(&none, 10).unwrap().is_empty());
        assert!(engine.top_emojis(&nulls, 10).unwrap().is_empty());
    }
}

/// Bad dates, authors or mention lists do not stop a record's text from counting.
#[test]
fn other_fields_do_not_matter() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_ndjson(dir.path(), "malformed.ndjson", &rows_malformed());

    for engine in engines() {
        assert_eq!(
            pairs(&engine.top_emojis(&path, 10).unwrap()),
            owned(&[("😺", 3), ("💥", 1), ("🙈", 1), ("🤖", 1)])
        );
    }
}

/// Emoji sequences are split into their pictographic members.
#[test]
fn sequences_decompose() {
    let family = "👨\u{200d}👩\u{200d}👧";
    assert_eq!(pictographs(family).collect::<Vec<_>>(), vec!["👨", "👩", "👧"]);
    assert_eq!(pictographs("I ❤\u{fe0f} it").collect::<Vec<_>>(), vec!["❤"]);
    assert_eq!(pictographs("plain ascii 123").count(), 0);

    assert!(is_pictographic('🙏'));
    assert!(!is_pictographic('a'));
    assert!(!is_pictographic('1'));

    let dir = tempfile::tempdir().unwrap();
    let rows = vec![
        json!({"content": format!("{family} {family}")}),
        json!({"content": "❤\u{fe0f}"}),
        json!({"content": 42}),
        json!({"content": ""}),
    ];
    let path = write_ndjson(dir.path(), "seq.ndjson", &rows);
    for engine in engines() {
        assert_eq!(
            pairs(&engine.top_emojis(&path, 10).unwrap()),
            owned(&[("👧", 2), ("👨", 2), ("👩", 2), ("❤", 1)])
        );
    }
}
