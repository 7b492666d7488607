use post_stats::aggregate::newline_chunks;
use post_stats::columnar::{group_count, load_mentions, ListColumn};
use post_stats::{
    check_top_n, sort_then_slice, top_k, Aggregator, EmojiCounts, EngineError, EngineOptions, MentionCounts, PostStats, Ranked,
    ScanStats, StrategyKind, TopK,
};

fn owned(v: &[(&str, u64)]) -> Vec<(String, u64)> {
    v.iter().map(|(k, c)| (k.to_string(), *c)).collect()
}

fn counts() -> Vec<(String, u64)> {
    owned(&[("m", 2), ("b", 5), ("z", 2), ("a", 2), ("q", 9), ("c", 1), ("zero", 0)])
}

/// Heap selection and full sort agree, including the key tie-break.
#[test]
fn heap_and_sort_agree() {
    for n in 1..=8 {
        let heap = top_k(counts(), n);
        let sorted = sort_then_slice(counts(), n);
        assert_eq!(heap, sorted, "n = {n}");
    }
    assert_eq!(
        top_k(counts(), 5),
        owned(&[("q", 9), ("b", 5), ("a", 2), ("m", 2), ("z", 2)])
    );
}

/// Zero counts never rank, and asking for more than exists returns everything.
#[test]
fn zero_counts_drop_and_n_caps() {
    let all = top_k(counts(), 100);
    assert_eq!(all.len(), 6);
    assert!(all.iter().all(|(_, c)| *c > 0));
    assert_eq!(sort_then_slice(counts(), 100), all);

    let mut top = TopK::new(2);
    assert!(top.is_empty());
    top.offer("x", 0);
    assert!(top.is_empty());
    top.offer("x", 1);
    top.offer("y", 1);
    top.offer("w", 1);
    assert_eq!(top.len(), 2);
    assert_eq!(top.into_sorted_vec(), vec![("w", 1), ("x", 1)]);
}

#[test]
fn n_must_be_positive() {
    assert!(check_top_n(1).is_ok());
    assert!(matches!(check_top_n(0), Err(EngineError::InvalidParameter { name: "n", .. })));
}

#[test]
fn group_count_runs() {
    let keys = vec!["b", "a", "b", "c", "b", "a"];
    assert_eq!(group_count(keys), vec![("a", 2), ("b", 3), ("c", 1)]);
    assert!(group_count(Vec::<u32>::new()).is_empty());
}

/// Row `i` of a list column owns exactly its own mentions; bad rows are empty.
#[test]
fn list_column_rows() {
    let lines: [&[u8]; 4] = [
        br#"{"mentionedUsers": [{"username": "a"}, "b"]}"#,
        br#"{"mentionedUsers": null}"#,
        b"not json",
        br#"{"mentionedUsers": ["c"]}"#,
    ];
    let numbered: Vec<(u64, &[u8])> = lines.into_iter().enumerate().map(|(i, l)| (i as u64 + 1, l)).collect();
    let mut stats = ScanStats::default();
    let col = load_mentions(&numbered, &mut stats);

    assert_eq!(stats, ScanStats { records: 3, malformed: 1 });
    assert_eq!(col.rows(), 4);
    assert_eq!(col.row(0), ["a".to_string(), "b".to_string()]);
    assert!(col.row(1).is_empty());
    assert!(col.row(2).is_empty());
    assert_eq!(col.row(3), ["c".to_string()]);

    use rayon::prelude::*;
    let mut flat: Vec<&str> = col.explode().collect();
    flat.sort_unstable();
    assert_eq!(flat, vec!["a", "b", "c"]);
    assert_eq!(ListColumn::default().rows(), 0);
}

/// Chunks end on newlines, cover the input exactly, and number their first line.
#[test]
fn chunks_align_to_lines() {
    let text: String = (1..=50).map(|i| format!("line {i}\n")).collect();
    let chunks = newline_chunks(text.as_bytes(), 40);
    assert!(chunks.len() > 1);

    let joined: Vec<u8> = chunks.iter().flat_map(|(_, c)| c.iter().copied()).collect();
    assert_eq!(joined, text.as_bytes());
    for (first_line, chunk) in &chunks {
        assert!(chunk.ends_with(b"\n"));
        let expected = format!("line {first_line}\n");
        assert!(chunk.starts_with(expected.as_bytes()), "chunk at line {first_line}");
    }
    assert!(newline_chunks(b"", 40).is_empty());

    // A target larger than any address range is one chunk, not an overflow.
    let whole = newline_chunks(text.as_bytes(), usize::MAX);
    assert_eq!(whole, vec![(1, text.as_bytes())]);
}

#[test]
fn unbounded_chunk_size_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two.ndjson");
    std::fs::write(
        &path,
        "{\"content\": \"🔥\", \"mentionedUsers\": [\"x\"]}\n{\"content\": \"🔥🙏\"}\n",
    )
    .unwrap();
    let engine = PostStats::new()
        .strategy(StrategyKind::Parallel)
        .options(EngineOptions::default().with_chunk_bytes(usize::MAX));
    assert_eq!(
        engine.top_emojis(&path, 5).unwrap(),
        vec![Ranked::new("🔥", 2), Ranked::new("🙏", 1)]
    );
}

/// Merging two partial counts equals counting everything in one place.
#[test]
fn merge_is_additive() {
    let rec = |s: &str| serde_json::from_str::<post_stats::PostRecord>(s).unwrap();
    let a_line = rec(r#"{"content": "🔥🔥", "mentionedUsers": ["x"]}"#);
    let b_line = rec(r#"{"content": "🔥 🙏", "mentionedUsers": ["x", "y"]}"#);

    let mut whole = EmojiCounts::default();
    whole.ingest(&a_line);
    whole.ingest(&b_line);
    let mut left = EmojiCounts::default();
    left.ingest(&a_line);
    let mut right = EmojiCounts::default();
    right.ingest(&b_line);
    left.merge(right);
    assert_eq!(left.count("🔥"), 3);
    assert_eq!(left.distinct_keys(), whole.distinct_keys());
    assert_eq!(left.finish(10), whole.finish(10));

    let mut m = MentionCounts::default();
    m.ingest(&a_line);
    let mut other = MentionCounts::default();
    other.ingest(&b_line);
    m.merge(other);
    assert_eq!(m.count("x"), 2);
    assert_eq!(m.count("nobody"), 0);
}

#[test]
fn option_clamps() {
    let opts = EngineOptions::default().with_read_buffer(1).with_chunk_bytes(1).with_parallelism(0);
    assert_eq!(opts.read_buffer_bytes, 8 * 1024);
    assert_eq!(opts.chunk_bytes, 64 * 1024);
    assert_eq!(opts.parallelism, None);
    assert_eq!(EngineOptions::default().with_parallelism(3).parallelism, Some(3));
}
