//! HTTP server lifecycle: bind, advertise, serve until told to stop, clean up.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::middleware;
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use tutor_core::api::{write_snapshot, CliError};

use super::{
    middleware::{create_middleware_stack, request_logger},
    routes::create_router,
    socket::{remove_socket, serve_socket},
    AppState,
};

#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    /// 0 lets the OS pick.
    pub port: u16,
    pub socket: Option<PathBuf>,
    /// Where `serve.json` is advertised.
    pub serve_info: PathBuf,
    /// Removed on shutdown along with `serve.json`.
    pub token_file: Option<PathBuf>,
    pub request_timeout: Duration,
}

/// Contents of `serve.json`, so local tools can find a running server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServeInfo {
    pub port: u16,
    pub pid: u32,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
    pub auth: bool,
    pub started_at: String,
}

pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: AppState,
    opts: ServerOptions,
}

impl Server {
    pub async fn bind(opts: ServerOptions, state: AppState) -> Result<Self, CliError> {
        let addr = format!("{}:{}", opts.host, opts.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| CliError::Serve(format!("cannot bind {addr}: {e}")))?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            state,
            opts,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.local_addr())
    }

    /// Serve until a shutdown broadcast, Ctrl+C or SIGTERM.
    pub async fn run(self) -> Result<(), CliError> {
        let Server {
            listener,
            local_addr,
            state,
            opts,
        } = self;
        let url = format!("http://{local_addr}");

        let info_record = ServeInfo {
            port: local_addr.port(),
            pid: std::process::id(),
            url: url.clone(),
            socket: opts.socket.as_ref().map(|p| p.display().to_string()),
            auth: state.auth_enabled(),
            started_at: chrono::Utc::now().to_rfc3339(),
        };
        if !write_snapshot(&opts.serve_info, &info_record) {
            warn!(target: "tutor.serve", path = %opts.serve_info.display(), "could not write serve info");
        }

        let socket_task = opts.socket.clone().map(|path| {
            let state = state.clone();
            tokio::spawn(async move {
                if let Err(e) = serve_socket(path.clone(), state).await {
                    warn!(target: "tutor.serve", error = %e, socket = %path.display(), "unix socket stopped");
                }
            })
        });

        let app = create_router(state.clone())
            .layer(middleware::from_fn(request_logger))
            .layer(create_middleware_stack(opts.request_timeout));

        info!(target: "tutor.serve", %url, auth = state.auth_enabled(), "listening");

        let shutdown_tx = state.shutdown_tx.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();
        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = signal::ctrl_c() => info!(target: "tutor.serve", "received Ctrl+C"),
                    _ = wait_for_sigterm() => info!(target: "tutor.serve", "received SIGTERM"),
                    _ = shutdown_rx.recv() => info!(target: "tutor.serve", "shutdown requested"),
                }
                // open SSE streams and socket clients watch the same channel
                let _ = shutdown_tx.send(());
            })
            .await;

        if let Some(task) = socket_task {
            let _ = task.await;
        }
        cleanup(&opts);
        info!(target: "tutor.serve", "server stopped");

        served.map_err(|e| CliError::Serve(e.to_string()))
    }
}

fn cleanup(opts: &ServerOptions) {
    let mut files = vec![opts.serve_info.clone()];
    files.extend(opts.token_file.clone());
    for f in files {
        if let Err(e) = std::fs::remove_file(&f) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(target: "tutor.serve", error = %e, path = %f.display(), "cleanup failed");
            }
        }
    }
    if let Some(sock) = &opts.socket {
        remove_socket(sock);
    }
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!(target: "tutor.serve", error = %e, "SIGTERM handler unavailable");
            std::future::pending::<()>().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
