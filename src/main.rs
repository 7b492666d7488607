use anyhow::{anyhow, bail, Context, Result};
use post_stats::{init_tracing_once, resident_bytes, EngineOptions, StrategyKind};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::Instant;

const DEFAULT_N: usize = 10;
const USAGE: &str = "usage: post-stats <file.ndjson[.zst]> [n] [streaming|columnar|parallel|all]";

fn report<T: Serialize>(strategy: StrategyKind, aggregate: &str, started: Instant, result: &T) -> Result<()> {
    let line = json!({
        "strategy": strategy.as_str(),
        "aggregate": aggregate,
        "elapsed_ms": started.elapsed().as_secs_f64() * 1000.0,
        "resident_bytes": resident_bytes(),
        "result": result,
    });
    println!("{}", serde_json::to_string(&line)?);
    Ok(())
}

fn run_all(kind: StrategyKind, opts: &EngineOptions, path: &Path, n: usize) -> Result<()> {
    let strategy = kind.build(opts.clone().with_progress_label(kind.as_str()));

    let t = Instant::now();
    let dates = strategy.top_active_dates(path, n).with_context(|| format!("{kind}: top_active_dates"))?;
    report(kind, "top_active_dates", t, &dates)?;

    let t = Instant::now();
    let emojis = strategy.top_emojis(path, n).with_context(|| format!("{kind}: top_emojis"))?;
    report(kind, "top_emojis", t, &emojis)?;

    let t = Instant::now();
    let mentions = strategy.top_mentioned_users(path, n).with_context(|| format!("{kind}: top_mentioned_users"))?;
    report(kind, "top_mentioned_users", t, &mentions)?;
    Ok(())
}

fn main() -> Result<()> {
    init_tracing_once();
    let mut args = std::env::args().skip(1);
    let path = PathBuf::from(args.next().ok_or_else(|| anyhow!(USAGE))?);
    let n = match args.next() {
        Some(s) => s.parse::<usize>().with_context(|| format!("invalid n {s:?}\n{USAGE}"))?,
        None => DEFAULT_N,
    };
    let kinds: Vec<StrategyKind> = match args.next().as_deref() {
        None | Some("all") => StrategyKind::ALL.to_vec(),
        Some(s) => vec![s.parse().map_err(|e: String| anyhow!("{e}\n{USAGE}"))?],
    };
    if args.next().is_some() {
        bail!(USAGE);
    }

    let opts = EngineOptions::from_env();
    tracing::info!(path = %path.display(), n, strategies = kinds.len(), "starting");
    for kind in kinds {
        run_all(kind, &opts, &path, n)?;
    }
    Ok(())
}
