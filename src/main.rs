// Tue Jan 13 2026 - Alex

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thread_engine::config::Config;
use thread_engine::engine::{mapped_engine, FutureEvent, TaskFuture, WorkerPool};
use thread_engine::utils::logging::{LoggingUtils, ProgressLogger};
use thread_engine::utils::{format_duration, pluralize, throughput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Single,
    Blocking,
    Async,
}

#[derive(Parser, Debug)]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Runs a synthetic parallel map on the thread engine", long_about = None)]
struct Args {
    #[arg(short, long)]
    threads: Option<usize>,

    #[arg(short = 'n', long, default_value_t = 10_000)]
    items: usize,

    /// Busy work per item, in microseconds
    #[arg(short, long, default_value_t = 50)]
    work_us: u64,

    #[arg(short, long, value_enum, default_value_t = Mode::Async)]
    mode: Mode,

    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    no_progress: bool,
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("{} {:#}", "[!]".red(), e);
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(threads) = args.threads {
        config = config.with_max_threads(threads);
    }
    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {}", e);
    }

    let level = if args.verbose {
        LoggingUtils::level_from_verbosity(2)
    } else {
        LoggingUtils::level_from_str(&config.log_level).unwrap_or(log::LevelFilter::Info)
    };
    LoggingUtils::init_logger(level);

    println!("{}", "Thread Engine".cyan().bold());
    println!("{}", "=".repeat(50).cyan());
    println!(
        "{} {} on {} in {:?} mode",
        "[*]".blue(),
        pluralize(args.items, "item", "items"),
        pluralize(config.max_threads, "thread", "threads"),
        args.mode
    );

    let pool = WorkerPool::from_config(&config);
    let items: Vec<u64> = (0..args.items as u64).collect();
    let work = Duration::from_micros(args.work_us);
    let engine = mapped_engine(&pool, items, move |x| busy_work(*x, work), config.block_size)
        .with_progress_interval(Duration::from_millis(config.progress_interval_ms));

    let start = Instant::now();
    let results = match args.mode {
        Mode::Single => engine.start_single_threaded_with(|kernel| kernel.take_results())?,
        Mode::Blocking => engine.start_blocking_with(|kernel| kernel.take_results())?,
        Mode::Async => {
            let future = engine.start_asynchronously();
            follow_progress(&future, args.no_progress);
            future.results()?
        }
    };
    let elapsed = start.elapsed();

    if results.len() != args.items {
        bail!("Expected {} results, got {}", args.items, results.len());
    }
    let checksum = results.iter().fold(0u64, |acc, v| acc.wrapping_add(*v));

    println!();
    println!("{}", "=".repeat(50).cyan());
    println!("{} Finished in {}", "[+]".green(), format_duration(elapsed));
    println!(
        "{} Throughput: {:.0} items/s",
        "[+]".green(),
        throughput(results.len(), elapsed)
    );
    println!("{} Checksum: {:#018x}", "[+]".green(), checksum);

    pool.shutdown();
    Ok(())
}

/// Spins for `work`, then mixes `seed` so the result depends on the input.
fn busy_work(seed: u64, work: Duration) -> u64 {
    let start = Instant::now();
    let mut x = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    loop {
        x ^= x >> 31;
        x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        if start.elapsed() >= work {
            return x;
        }
    }
}

fn follow_progress(future: &TaskFuture<u64>, no_progress: bool) {
    let events = future.watch();

    if no_progress {
        let mut logger = ProgressLogger::new("map", 0);
        for event in events {
            match event {
                FutureEvent::ProgressRange { maximum, .. } => logger.set_total(maximum.max(0) as usize),
                FutureEvent::Progress { value, .. } => logger.set(value.max(0) as usize),
                FutureEvent::Finished => break,
                _ => {}
            }
        }
        logger.finish();
        return;
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    for event in events {
        match event {
            FutureEvent::ProgressRange { maximum, .. } => pb.set_length(maximum.max(0) as u64),
            FutureEvent::Progress { value, .. } => pb.set_position(value.max(0) as u64),
            FutureEvent::Canceled => pb.set_message("canceled"),
            FutureEvent::Finished => break,
            _ => {}
        }
    }
    pb.finish_and_clear();
}
