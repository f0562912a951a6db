//! Runtime Configuration
//!
//! Everything tunable about a run: the graph instance, the source node,
//! pacing, and the optional step log. Loaded from environment variables
//! (with .env support) or from a TOML file.

use eyre::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;

use crate::graph::GraphSpec;
use crate::stepper::StepSnapshot;

// ============================================
// RUN MODE
// ============================================

/// How the driver paces the stepper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Advance on key presses (next / reset / quit).
    Interactive,

    /// Advance on a timer until the run completes.
    Auto,
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Interactive
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Interactive => write!(f, "INTERACTIVE"),
            RunMode::Auto => write!(f, "AUTO"),
        }
    }
}

// ============================================
// MAIN CONFIGURATION
// ============================================

/// Main configuration for the simulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // ========== Pacing ==========
    /// Current run mode
    pub run_mode: RunMode,

    /// Delay between steps in auto mode, in milliseconds
    pub step_delay_ms: u64,

    // ========== Instance ==========
    /// Source node label; defaults to the first declared node when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_node: Option<String>,

    /// The problem instance itself
    pub graph: GraphSpec,

    // ========== Step Log ==========
    /// Enable/disable the JSONL step log
    pub step_log: bool,

    /// Path the step log is appended to
    pub step_log_path: String,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let graph = match env::var("GRAPH_FILE") {
            Ok(path) => {
                let content = fs::read_to_string(&path)?;
                toml::from_str(&content)?
            }
            Err(_) => GraphSpec::sample(),
        };

        Ok(Self {
            run_mode: match env::var("RUN_MODE")
                .unwrap_or_else(|_| "interactive".to_string())
                .to_lowercase()
                .as_str()
            {
                "auto" => RunMode::Auto,
                _ => RunMode::Interactive,
            },
            step_delay_ms: env::var("STEP_DELAY_MS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .unwrap_or(600),
            source_node: env::var("SOURCE_NODE").ok(),
            graph,
            step_log: env::var("STEP_LOG")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            step_log_path: env::var("STEP_LOG_PATH")
                .unwrap_or_else(|_| "./logs/steps.jsonl".to_string()),
        })
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration before a run.
    pub fn validate(&self) -> Result<()> {
        if self.graph.nodes.is_empty() {
            return Err(eyre::eyre!("graph instance must declare at least one node"));
        }

        let labels: HashSet<&str> = self.graph.nodes.iter().map(String::as_str).collect();
        if labels.len() != self.graph.nodes.len() {
            return Err(eyre::eyre!("graph instance declares duplicate node labels"));
        }

        for edge in &self.graph.edges {
            if !labels.contains(edge.from.as_str()) {
                return Err(eyre::eyre!(
                    "edge {}→{} references unknown node '{}'",
                    edge.from,
                    edge.to,
                    edge.from
                ));
            }
            if !labels.contains(edge.to.as_str()) {
                return Err(eyre::eyre!(
                    "edge {}→{} references unknown node '{}'",
                    edge.from,
                    edge.to,
                    edge.to
                ));
            }
        }

        if let Some(source) = &self.source_node {
            if !labels.contains(source.as_str()) {
                return Err(eyre::eyre!("SOURCE_NODE '{}' is not in the graph", source));
            }
        }

        if self.step_delay_ms > 10_000 {
            return Err(eyre::eyre!(
                "STEP_DELAY_MS > 10000 makes auto mode crawl (currently {})",
                self.step_delay_ms
            ));
        }

        Ok(())
    }

    /// Print configuration summary.
    pub fn print_summary(&self) {
        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              STEPWISE - CONFIGURATION                      ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Run Mode:          {:^40} ║", self.run_mode);
        println!("║ Step Delay:        {:>37} ms ║", self.step_delay_ms);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ INSTANCE                                                   ║");
        println!("║ • Nodes:           {:^40} ║", self.graph.nodes.len());
        println!("║ • Edges:           {:^40} ║", self.graph.edges.len());
        println!(
            "║ • Source:          {:^40} ║",
            self.source_node
                .as_deref()
                .or_else(|| self.graph.nodes.first().map(String::as_str))
                .unwrap_or("-")
        );
        println!("╠════════════════════════════════════════════════════════════╣");
        println!(
            "║ Step Log:          {:^40} ║",
            if self.step_log {
                self.step_log_path.as_str()
            } else {
                "✗ Disabled"
            }
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Interactive,
            step_delay_ms: 600,
            source_node: None,
            graph: GraphSpec::sample(),
            step_log: false,
            step_log_path: "./logs/steps.jsonl".to_string(),
        }
    }
}

// ============================================
// STEP LOGGER
// ============================================

use chrono::{DateTime, Utc};
use std::io::Write;

/// One line of the JSONL step log: the snapshot the driver just rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepLogEntry {
    pub timestamp: DateTime<Utc>,
    pub step: usize,
    pub snapshot: StepSnapshot,
}

impl StepLogEntry {
    /// Append this entry to a file.
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new().create(true).append(true).open(path)?;

        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

// ============================================
// TESTS
// ============================================
