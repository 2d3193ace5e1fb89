use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "slipcraft",
    about = "Author fixture strategies and run them over pools to build outcome slips"
)]
pub struct Cli {
    /// Evaluate pool fixtures one at a time instead of on the worker pool
    #[arg(long, global = true)]
    pub sequential: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage strategies
    Strategy {
        #[command(subcommand)]
        command: StrategyCommand,
    },
    /// Add, remove or edit steps
    Step {
        #[command(subcommand)]
        command: StepCommand,
    },
    /// Branch edge configuration
    Branch {
        #[command(subcommand)]
        command: BranchCommand,
    },
    /// Change the margin scale bound (>= 50)
    Scale {
        strategy: String,
        max_margin: f64,
    },
    /// List catalogued metrics
    Metrics {
        /// Optional category filter (attack, defence, possession, discipline, form, set_pieces)
        #[arg(long)]
        category: Option<String>,
    },
    /// Run a strategy over a pool file and print the slip
    Run {
        /// Strategy ID
        strategy: String,
        /// Pool file (JSON with fixtures + samples, or a bare sample list)
        pool: String,
    },
    /// Recommend an outcome for a single fixture sample
    Evaluate {
        /// Strategy ID
        strategy: String,
        /// JSON sample with fixtureId and values
        json: String,
    },
}

#[derive(Subcommand)]
pub enum StrategyCommand {
    /// Create an empty strategy
    Create {
        name: String,
        #[arg(long, default_value = "50")]
        max_margin: f64,
    },
    /// Import a strategy definition from a JSON file
    Import { name: String, file: String },
    /// List stored strategies
    List,
    /// Show a strategy with its full definition
    Show { id: String },
    /// Check a strategy against every run-time invariant
    Validate { id: String },
    /// Delete a strategy
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum StepCommand {
    /// Append a step with default ranges and match edges
    Add {
        strategy: String,
        #[arg(long)]
        metric: Option<String>,
    },
    /// Remove a step and its branch configs
    Remove { strategy: String, step: String },
    /// Move a step to a new position (0-based)
    Move {
        strategy: String,
        step: String,
        index: usize,
    },
    /// Bind a step to a metric, or unbind it when --metric is omitted
    Metric {
        strategy: String,
        step: String,
        #[arg(long)]
        metric: Option<String>,
    },
    /// Set the range of a step on one branch
    Range {
        strategy: String,
        step: String,
        /// Branch (home, draw, away)
        branch: String,
        #[arg(allow_negative_numbers = true)]
        min: f64,
        #[arg(allow_negative_numbers = true)]
        max: f64,
        /// Ignore min: the range becomes `margin <= max`
        #[arg(long)]
        min_open: bool,
        /// Ignore max: the range becomes `margin >= min`
        #[arg(long)]
        max_open: bool,
    },
}

#[derive(Subcommand)]
pub enum BranchCommand {
    /// Set the edge type of a step on one branch
    Set {
        /// Strategy ID
        strategy: String,
        /// Branch (home, draw, away)
        branch: String,
        /// Step ID
        step: String,
        /// Edge type (match, weight)
        edge: String,
        /// Weight for weight edges (0-10)
        #[arg(long)]
        weight: Option<i64>,
    },
}
