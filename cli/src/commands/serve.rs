use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::broadcast;

use tutor_core::api::{AppConfig, CliError, RecordPaths};
use tutor_core::config::expand;

use super::cli::ServeArgs;
use crate::http::{
    auth::{generate_token, write_token_file},
    server::{Server, ServerOptions},
    AppState,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn handle_serve(args: ServeArgs, root: &Path, cfg: &AppConfig) -> Result<i32, CliError> {
    let paths = RecordPaths::resolve(root, &cfg.records);
    std::fs::create_dir_all(&paths.dir)?;

    let no_auth = args.no_auth || cfg.server.no_auth;
    let token_file = if no_auth {
        None
    } else {
        Some(
            cfg.server
                .token_file
                .as_deref()
                .map(|p| resolve_under(root, p))
                .unwrap_or_else(|| paths.token()),
        )
    };
    let token = match &token_file {
        Some(path) => {
            let token = generate_token();
            write_token_file(path, &token)?;
            Some(token)
        }
        None => {
            tracing::warn!(target: "tutor.serve", "bearer auth disabled");
            None
        }
    };

    let socket = args
        .socket
        .or_else(|| cfg.server.socket_path.as_deref().map(|p| resolve_under(root, p)));
    let opts = ServerOptions {
        host: args.host.unwrap_or_else(|| cfg.server.host.clone()),
        port: args.port.unwrap_or(cfg.server.port),
        socket: socket.clone(),
        serve_info: paths.serve_info(),
        token_file: token_file.clone(),
        request_timeout: REQUEST_TIMEOUT,
    };

    let (shutdown_tx, _) = broadcast::channel(4);
    let poll = Duration::from_millis(cfg.server.poll_interval_ms.max(10));
    let state = AppState::new(&paths, token, poll, shutdown_tx);
    let server = Server::bind(opts, state).await?;

    eprintln!("tutor serve: {}", server.url());
    if let Some(path) = &token_file {
        eprintln!("  token: {}", path.display());
    }
    if let Some(path) = &socket {
        eprintln!("  socket: {}", path.display());
    }

    server.run().await?;
    Ok(0)
}

fn resolve_under(root: &Path, raw: &str) -> PathBuf {
    let p = PathBuf::from(expand(raw));
    if p.is_absolute() {
        p
    } else {
        root.join(p)
    }
}
