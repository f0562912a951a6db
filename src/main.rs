//! Stepwise - Interactive Bellman-Ford Step Simulator
//!
//! Run with: cargo run
//!
//! Advances the algorithm one unit of work per key press (or per timer tick
//! in auto mode) and renders the run state after every step.

use chrono::Utc;
use clap::Parser;
use color_eyre::eyre::Result;
use console::{style, Key, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod graph;
mod render;
mod stepper;

use config::{Config, RunMode, StepLogEntry};
use graph::GraphModel;
use render::render_step;
use stepper::{BellmanFordStepper, StepSnapshot};

#[derive(Debug, Parser)]
#[command(name = "stepwise", about = "Step-by-step Bellman-Ford simulator")]
struct Cli {
    /// Load configuration from a TOML file instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Load the graph instance from a TOML file
    #[arg(long)]
    graph: Option<PathBuf>,

    /// Advance on a timer instead of key presses
    #[arg(long)]
    auto: bool,

    /// Delay between steps in auto mode, in milliseconds
    #[arg(long)]
    delay: Option<u64>,

    /// Source node label (defaults to the first declared node)
    #[arg(long)]
    source: Option<String>,
}

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🧭 STEPWISE - Bellman-Ford Step Simulator").cyan().bold()
    );
    println!(
        "{}",
        style("    One edge at a time | Negative cycle detection").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn append_step_log(config: &Config, step: usize, snapshot: &StepSnapshot) {
    if !config.step_log {
        return;
    }

    let entry = StepLogEntry {
        timestamp: Utc::now(),
        step,
        snapshot: snapshot.clone(),
    };

    if let Err(e) = entry.append_to_file(&config.step_log_path) {
        warn!("failed to append step log: {}", e);
    }
}

/// Key-paced loop: n/space/enter advances, r resets, q quits.
fn run_interactive(
    term: &Term,
    config: &Config,
    stepper: &mut BellmanFordStepper<'_>,
    mut step: usize,
) -> Result<usize> {
    println!();
    println!(
        "{}",
        style("Keys: [n/space/enter] next step  [r] reset  [q] quit").dim()
    );

    loop {
        match term.read_key()? {
            Key::Char('n') | Key::Char(' ') | Key::Enter => {
                if stepper.is_complete() {
                    println!(
                        "{}",
                        style("Run is complete - press [r] to reset or [q] to quit.").dim()
                    );
                    continue;
                }
                step += 1;
                let snapshot = stepper.step();
                render_step(&config.graph, &snapshot, step);
                append_step_log(config, step, &snapshot);
            }
            Key::Char('r') => {
                step = 0;
                let snapshot = stepper.reset();
                render_step(&config.graph, &snapshot, step);
                append_step_log(config, step, &snapshot);
            }
            Key::Char('q') | Key::Escape => break,
            _ => {}
        }
    }

    Ok(step)
}

/// Timer-paced loop: advances until the run completes.
fn run_auto(config: &Config, stepper: &mut BellmanFordStepper<'_>, mut step: usize) -> Result<usize> {
    let bar = ProgressBar::new(stepper.total_steps() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{bar:40.cyan/blue} {pos}/{len} steps",
    )?);
    bar.set_position(step as u64);

    while !stepper.is_complete() {
        thread::sleep(Duration::from_millis(config.step_delay_ms));
        step += 1;
        let snapshot = stepper.step();
        bar.suspend(|| render_step(&config.graph, &snapshot, step));
        append_step_log(config, step, &snapshot);
        bar.inc(1);
    }

    bar.finish_and_clear();
    Ok(step)
}

fn print_run_summary(stepper: &BellmanFordStepper<'_>, steps: usize) {
    let snapshot = stepper.snapshot();

    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").green()
    );
    println!("{}", style(" ✅ RUN FINISHED").green().bold());
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").green()
    );
    println!();
    println!("Summary:");
    println!("  • Steps taken: {}", steps);
    println!(
        "  • Passes completed: {} / {}",
        snapshot.iteration, snapshot.iteration_bound
    );
    if snapshot.is_complete() {
        println!(
            "  • Negative cycle: {}",
            if snapshot.has_negative_cycle {
                style("detected").yellow().bold().to_string()
            } else {
                style("none").green().to_string()
            }
        );
        let distances: Vec<String> = snapshot
            .distances
            .iter()
            .map(|(node, d)| format!("{}={}", node, d))
            .collect();
        println!("  • Final distances: {}", distances.join("  "));
    } else {
        println!("  • Run stopped before completion");
    }
    println!();
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("stepwise=info".parse()?),
        )
        .init();

    print_banner();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    // CLI flags win over environment and file settings.
    if let Some(path) = &cli.graph {
        let content = std::fs::read_to_string(path)?;
        config.graph = toml::from_str(&content)?;
    }
    if cli.auto {
        config.run_mode = RunMode::Auto;
    }
    if let Some(delay) = cli.delay {
        config.step_delay_ms = delay;
    }
    if let Some(source) = &cli.source {
        config.source_node = Some(source.clone());
    }

    config.validate()?;
    config.print_summary();

    let model = GraphModel::from_spec(&config.graph)?;
    let source = model.resolve_source(config.source_node.as_deref())?;

    let mut stepper = BellmanFordStepper::new(&model, source);
    let snapshot = stepper.snapshot();
    render_step(&config.graph, &snapshot, 0);
    append_step_log(&config, 0, &snapshot);

    let term = Term::stdout();
    let steps = match config.run_mode {
        // A detached stdout (pipe, CI) cannot take key input; fall through
        // to the timer loop.
        RunMode::Interactive if term.is_term() => {
            run_interactive(&term, &config, &mut stepper, 0)?
        }
        _ => run_auto(&config, &mut stepper, 0)?,
    };

    print_run_summary(&stepper, steps);

    Ok(())
}
