use clap::Parser;

mod commands;
mod http;
mod logging;

use commands::cli::{Args, Commands};
use commands::{inspect, serve, toolchain};
use tutor_core::api::{load_config, resolve_root, CliError, Command};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    match run(args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("tutor: {e}");
            let mut source = std::error::Error::source(&e);
            while let Some(s) = source {
                eprintln!("  caused by: {s}");
                source = s.source();
            }
            std::process::exit(2);
        }
    }
}

async fn run(args: Args) -> Result<i32, CliError> {
    let root = resolve_root(args.dir.as_deref());
    let cfg = load_config(&root)?;
    // held until exit so buffered file logs are flushed
    let _log_guard = logging::init_logging(&cfg.logging);
    tracing::debug!(root = %root.display(), "config loaded");

    match args.command {
        Commands::Build(a) => toolchain::handle_toolchain(Command::Build, a, &root, &cfg).await,
        Commands::Run(a) => toolchain::handle_toolchain(Command::Run, a, &root, &cfg).await,
        Commands::Test(a) => toolchain::handle_toolchain(Command::Test, a, &root, &cfg).await,
        Commands::Serve(a) => serve::handle_serve(a, &root, &cfg).await,
        Commands::Status(a) => inspect::handle_status(a, &root, &cfg, &mut std::io::stdout()),
        Commands::Summary => inspect::handle_summary(&root, &cfg, &mut std::io::stdout()),
        Commands::Tail(a) => inspect::handle_tail(a, &root, &cfg, &mut std::io::stdout()),
    }
}
