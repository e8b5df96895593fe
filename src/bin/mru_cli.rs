use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hdrhistogram::Histogram;
use log::info;
use mru_queue::MruQueue;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "mru-cli", version, about = "MRU queue tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch positions in order and print each fetched value
    Fetch {
        /// Size of the universe 1..=N
        #[arg(long = "upper-limit")]
        upper_limit: u32,
        /// 1-based positions to fetch
        #[arg(required = true)]
        positions: Vec<u32>,
        /// Emit one JSON document instead of plain lines
        #[arg(long)]
        json: bool,
        /// Print the final order after all fetches
        #[arg(long = "show-order")]
        show_order: bool,
    },
    /// Run a seeded random fetch workload and report touch and latency percentiles
    Bench {
        #[arg(long = "upper-limit", default_value_t = 10_000)]
        upper_limit: u32,
        #[arg(long, default_value_t = 1_000_000)]
        fetches: u64,
        #[arg(long, default_value_t = 0x9E37_79B9)]
        seed: u64,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct FetchReport {
    upper_limit: u32,
    fetched: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<Vec<u32>>,
}

#[derive(Serialize)]
struct BenchReport {
    upper_limit: u32,
    section_size: usize,
    fetches: u64,
    elapsed_ms: f64,
    fetches_per_sec: f64,
    touches_mean: f64,
    touches_p50: u64,
    touches_p99: u64,
    touches_max: u64,
    touches_per_section: f64,
    latency_ns_p50: u64,
    latency_ns_p99: u64,
    latency_ns_p999: u64,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut out = io::BufWriter::new(io::stdout());
    match cli.command {
        Commands::Fetch {
            upper_limit,
            positions,
            json,
            show_order,
        } => {
            let report = fetch(upper_limit, &positions, show_order)?;
            if json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                for value in &report.fetched {
                    writeln!(out, "{value}")?;
                }
                if let Some(order) = &report.order {
                    let order: Vec<String> = order.iter().map(u32::to_string).collect();
                    writeln!(out, "order: {}", order.join(" "))?;
                }
            }
        }
        Commands::Bench {
            upper_limit,
            fetches,
            seed,
            json,
        } => {
            let report = bench(upper_limit, fetches, seed)?;
            if json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                writeln!(
                    out,
                    "n={} section_size={} fetches={} elapsed={:.1}ms rate={:.0}/s",
                    report.upper_limit,
                    report.section_size,
                    report.fetches,
                    report.elapsed_ms,
                    report.fetches_per_sec
                )?;
                writeln!(
                    out,
                    "touches mean={:.2} p50={} p99={} max={} max/section_size={:.2}",
                    report.touches_mean,
                    report.touches_p50,
                    report.touches_p99,
                    report.touches_max,
                    report.touches_per_section
                )?;
                writeln!(
                    out,
                    "latency p50={}ns p99={}ns p999={}ns",
                    report.latency_ns_p50, report.latency_ns_p99, report.latency_ns_p999
                )?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn fetch(upper_limit: u32, positions: &[u32], show_order: bool) -> Result<FetchReport> {
    let mut queue = MruQueue::new(upper_limit).context("create queue")?;
    let mut fetched = Vec::with_capacity(positions.len());
    for &position in positions {
        let value = queue
            .fetch(position)
            .with_context(|| format!("fetch position {position}"))?;
        fetched.push(value);
    }
    Ok(FetchReport {
        upper_limit,
        fetched,
        order: show_order.then(|| queue.to_vec()),
    })
}

fn bench(upper_limit: u32, fetches: u64, seed: u64) -> Result<BenchReport> {
    let mut queue = MruQueue::new(upper_limit).context("create queue")?;
    info!(
        "bench: n={} section_size={} sections={} fetches={}",
        upper_limit,
        queue.section_size(),
        queue.section_count(),
        fetches
    );

    let clock = quanta::Clock::new();
    let mut touches = Histogram::<u64>::new(3)?;
    let mut latency = Histogram::<u64>::new(3)?;
    let mut rng = SmallRng::seed_from_u64(seed);

    let start = clock.now();
    for _ in 0..fetches {
        let position = rng.random_range(1..=upper_limit);
        let before = clock.now();
        queue.fetch(position)?;
        let elapsed = clock.now().duration_since(before);
        let _ = latency.record(elapsed.as_nanos() as u64);
        let _ = touches.record(queue.stats().last_touches);
    }
    let elapsed = clock.now().duration_since(start);

    let stats = queue.stats();
    let secs = elapsed.as_secs_f64();
    Ok(BenchReport {
        upper_limit,
        section_size: queue.section_size(),
        fetches,
        elapsed_ms: secs * 1_000.0,
        fetches_per_sec: if secs > 0.0 { fetches as f64 / secs } else { 0.0 },
        touches_mean: stats.mean_touches(),
        touches_p50: touches.value_at_quantile(0.5),
        touches_p99: touches.value_at_quantile(0.99),
        touches_max: stats.max_touches,
        touches_per_section: stats.max_touches as f64 / queue.section_size() as f64,
        latency_ns_p50: latency.value_at_quantile(0.5),
        latency_ns_p99: latency.value_at_quantile(0.99),
        latency_ns_p999: latency.value_at_quantile(0.999),
    })
}
