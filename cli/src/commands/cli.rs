use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(name = "tutor", version, about = "Supervise toolchain runs and serve their live status")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root (defaults to $TUTOR_DIR, then the current directory).
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the project with the configured toolchain.
    Build(ToolchainArgs),
    /// Build and run an executable product.
    Run(ToolchainArgs),
    /// Build and run the test suite.
    Test(ToolchainArgs),
    /// Serve status, summary and live events over HTTP and a Unix socket.
    Serve(ServeArgs),
    /// Print the current status snapshot.
    Status(StatusArgs),
    /// Print the failure summary of the last run as JSON.
    Summary,
    /// Print the last events of the log.
    Tail(TailArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ToolchainArgs {
    /// Do not echo toolchain output.
    #[arg(long, short)]
    pub quiet: bool,

    /// Print `::error`/`::warning` annotations for each diagnostic.
    #[arg(long)]
    pub ci: bool,

    /// Never show the progress spinner.
    #[arg(long)]
    pub no_progress: bool,

    /// Title recorded in the status snapshot.
    #[arg(long)]
    pub title: Option<String>,

    /// Extra arguments passed to the toolchain (after `--`).
    #[arg(last = true)]
    pub passthrough: Vec<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    /// TCP port; 0 picks a free one.
    #[arg(long)]
    pub port: Option<u16>,

    /// Also stream over a Unix socket at this path.
    #[arg(long)]
    pub socket: Option<PathBuf>,

    /// Disable bearer-token checks (local development only).
    #[arg(long)]
    pub no_auth: bool,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct StatusArgs {
    /// Print the raw snapshot JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct TailArgs {
    #[arg(short = 'n', long = "lines", default_value_t = 20)]
    pub count: usize,

    #[arg(long)]
    pub errors_only: bool,
}
