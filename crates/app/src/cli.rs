//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Ledger - command line client for the budget tracker.
#[derive(Debug, Parser)]
#[command(name = "ledger")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true, env = "LEDGER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Account to sign in with when no session can be restored.
    #[arg(short, long, global = true, env = "LEDGER_USERNAME")]
    pub username: Option<String>,

    /// Password for `--username`. Only read from the environment.
    #[arg(long, env = "LEDGER_PASSWORD", hide = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the session state after bootstrap.
    Status,

    /// Create an account.
    Signup,

    /// List budget periods.
    Periods,

    /// List incomes.
    Incomes(PeriodFilter),

    /// List budget categories.
    Categories,

    /// List budget lines.
    Budgets(PeriodFilter),

    /// List daily house spendings.
    Spendings(PeriodFilter),

    /// List miscellaneous costs.
    MiscCosts,
}

impl Command {
    /// Returns true if the command needs a signed-in session.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        !matches!(self, Self::Status | Self::Signup)
    }
}

/// Restricts a listing to one period.
#[derive(Debug, Args)]
pub struct PeriodFilter {
    /// Period identifier.
    #[arg(short, long)]
    pub period: Option<u64>,
}
