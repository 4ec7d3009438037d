//! Command-line interface definition.
//!
//! The argument surface mirrors the advisor's editor contract: weights and
//! the kind-order preference are global flags so every subcommand shares
//! one configuration path.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use nudge_core::advisor::AdvisorConfig;
use nudge_core::error::NudgeError;
use nudge_core::score::Weights;
use nudge_core::types::{DeclarationKind, Position};

// ============================================================================
// CLI Structure
// ============================================================================

/// Declaration reordering advisor for TypeScript and JavaScript.
///
/// Nudge scores the order of a file's top-level declarations on dependency
/// direction, name similarity, and kind grouping, then proposes the single
/// move that improves the score the most. All output is JSON.
#[derive(Parser, Debug)]
#[command(name = "nudge", version, about = "Declaration reordering advisor")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
pub struct GlobalArgs {
    /// Weight of the dependency-ordering axis.
    #[arg(long, global = true, default_value_t = 1.0)]
    pub dependency_weight: f64,

    /// Weight of the name-similarity axis.
    #[arg(long, global = true, default_value_t = 1.0)]
    pub similarity_weight: f64,

    /// Weight of the kind-grouping axis.
    #[arg(long, global = true, default_value_t = 1.0)]
    pub kind_weight: f64,

    /// Preferred declaration-kind order, comma separated
    /// (e.g. `interface,typeAlias,class,function`).
    #[arg(long, global = true, value_delimiter = ',')]
    pub kind_order: Vec<String>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}

impl GlobalArgs {
    /// Build the advisor configuration from the weight and order flags.
    pub fn advisor_config(&self) -> Result<AdvisorConfig, NudgeError> {
        let weights = Weights::new(
            self.dependency_weight,
            self.similarity_weight,
            self.kind_weight,
        );

        let kind_order = if self.kind_order.is_empty() {
            DeclarationKind::ALL.to_vec()
        } else {
            self.kind_order
                .iter()
                .map(|name| {
                    DeclarationKind::parse(name).ok_or_else(|| {
                        NudgeError::invalid_args(format!(
                            "unknown declaration kind '{}' in --kind-order",
                            name
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(AdvisorConfig { weights, kind_order })
    }
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the advisor once and print the best move, if any.
    Propose {
        /// Cursor location (file:line:col, 1-indexed).
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        at: Option<String>,

        /// File to advise, with the cursor at the start of the file.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Run the advisor and apply the best move to the file in place.
    Apply {
        /// File to reorder.
        #[arg(long)]
        file: PathBuf,
    },

    /// Advise every TypeScript/JavaScript file under a directory.
    Scan {
        /// Root directory to walk.
        root: PathBuf,

        /// Narrow the scan to paths matching a glob (repeatable).
        #[arg(long)]
        include: Vec<String>,
    },

    /// JSON-lines advisory loop on stdin/stdout.
    Serve {
        /// Quiet period in milliseconds before a change triggers the advisor.
        #[arg(long, default_value_t = 300)]
        debounce_ms: u64,
    },
}

// ============================================================================
// Location Parsing
// ============================================================================

/// Parse a `file:line:col` location with 1-indexed line and column.
///
/// Split from the right so paths containing colons (Windows drives) stay
/// intact. Returns the file path and the 0-indexed cursor position.
pub fn parse_at(s: &str) -> Result<(String, Position), NudgeError> {
    let parts: Vec<&str> = s.rsplitn(3, ':').collect();
    if parts.len() != 3 {
        return Err(invalid_location(s));
    }
    let col: u32 = parts[0].parse().map_err(|_| invalid_location(s))?;
    let line: u32 = parts[1].parse().map_err(|_| invalid_location(s))?;
    if line == 0 || col == 0 {
        return Err(NudgeError::invalid_args(format!(
            "invalid location '{}': line and column are 1-indexed",
            s
        )));
    }
    Ok((parts[2].to_string(), Position::new(line - 1, col - 1)))
}

fn invalid_location(s: &str) -> NudgeError {
    NudgeError::invalid_args(format!(
        "invalid location '{}', expected file:line:col",
        s
    ))
}

// ============================================================================
// Tests
// ============================================================================
