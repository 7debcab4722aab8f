use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use semifactor::{
    config::{parse_target, CliOverrides},
    metrics::Phase,
    FactorConfig, FactorError, FactorReport, ParallelMode,
};
use std::{num::NonZeroUsize, path::PathBuf, process::ExitCode, time::Instant};
use tracing_subscriber::EnvFilter;

const RULE: &str = "----------------------------------------------------------";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Integer to factor (defaults to the config file value, then 71)
    #[arg(value_parser = parse_target)]
    target: Option<u64>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Which phases run in parallel
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); RUST_LOG wins if set
    #[arg(short, long)]
    log_level: Option<String>,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Print only the result line
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Sequential,
    Search,
    Full,
}

impl From<ModeArg> for ParallelMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Sequential => ParallelMode::Sequential,
            ModeArg::Search => ParallelMode::Search,
            ModeArg::Full => ParallelMode::Full,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            let fatal = err
                .downcast_ref::<FactorError>()
                .is_some_and(FactorError::is_allocation_failure);
            let label = if fatal { "Fatal" } else { "Error" };
            eprintln!("{}: {:#}", label.red().bold(), err);
            ExitCode::from(2)
        }
    }
}

/// Returns whether a factor pair was found
fn run() -> Result<bool> {
    let started = Instant::now();
    let cli = Cli::parse();

    let config = FactorConfig::load_from(cli.config.as_deref())?.merge_with_cli(CliOverrides {
        target: cli.target,
        thread_count: cli.threads,
        mode: cli.mode.map(ParallelMode::from),
        log_level: cli.log_level.clone(),
    });
    init_logging(&config.log_level);

    let verbose = !cli.quiet && !cli.json;
    if verbose {
        if config.uses_default_target() {
            println!("No target given; using default value.");
        }
        print_header(&config);
    }

    let report = semifactor::run(&config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.is_found());
    }

    if verbose {
        print_phases(&report);
    }
    print_result(&report);
    if verbose {
        println!(
            "Total run time: {}",
            humantime::format_duration(started.elapsed())
        );
    }

    Ok(report.is_found())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_header(config: &FactorConfig) {
    println!("{}", RULE);
    println!("Target = {}", config.target().to_string().cyan());
    println!(
        "Maximum lower prime = {}",
        semifactor::bound::sieve_bound(config.target())
    );
    println!("Workers = {} ({} mode)", config.workers(), config.mode);
    println!("{}", RULE);
}

fn print_phases(report: &FactorReport) {
    let phases = [
        (Phase::Sieve, format!("Sieving primes up to {}...", report.bound)),
        (
            Phase::Extract,
            format!("Collecting {} primes...", report.prime_count),
        ),
        (Phase::Search, "Attempting to factor...".to_string()),
    ];
    for (phase, label) in phases {
        let elapsed = humantime::format_duration(report.stats.phase_time(phase));
        println!("{} Done ({})", label, elapsed.to_string().green());
    }
}

fn print_result(report: &FactorReport) {
    match report.result.pair() {
        Some((p, q)) => println!(
            "{}",
            format!(">>>>> Primes found: {}, {} <<<<<", p, q)
                .green()
                .bold()
        ),
        None => println!("{}", "Prime factors not found.".yellow()),
    }
}
