use std::path::PathBuf;

use clap::Parser;

use ghost_bench::config::{BenchConfig, ResolvedOutputs};
use ghost_bench::logging::init_logging;
use ghost_bench::runner::BenchRunner;

/// Benchmarking harness for ghost-hunting policies.
#[derive(Debug, Parser)]
#[command(
    name = "ghost-bench",
    author,
    version,
    about = "Deterministic ghost-hunt session harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of sessions each agent plays.
    #[arg(long, value_name = "SESSIONS")]
    sessions: Option<usize>,

    /// Override the RNG seed for target placement.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no sessions are played).
    #[arg(long)]
    validate_only: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(sessions) = cli.sessions {
        config.sessions.count = sessions;
    }

    if let Some(seed) = cli.seed {
        config.sessions.seed = Some(seed);
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let sessions = config.sessions.count;

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agent{} ({sessions} sessions each)",
        if agent_count == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs, &run_id)?;
    let runner = BenchRunner::new(config, outputs)?;

    if cli.validate_only {
        println!("Validation-only mode: benchmark execution skipped.");
        return Ok(());
    }

    let summary = runner.run()?;
    println!(
        "Benchmark complete for '{run_id}': {} agents × {} sessions → {} rows at {}",
        summary.agents,
        summary.sessions_per_agent,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(plot_path) = summary.plot_path.as_ref() {
        println!("Win-rate plot: {}", plot_path.display());
    }
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }

    Ok(())
}
