//! Raw newline-delimited mirror of the live feed over a Unix socket.
//!
//! No HTTP framing and no token: filesystem permissions on the socket are the
//! access control.

use std::path::{Path, PathBuf};

use super::AppState;

#[cfg(unix)]
pub async fn serve_socket(path: PathBuf, state: AppState) -> std::io::Result<()> {
    use tokio::net::UnixListener;

    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let listener = UnixListener::bind(&path)?;
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }
    tracing::info!(target: "tutor.serve", socket = %path.display(), "unix socket listening");

    let mut shutdown_rx = state.shutdown_tx.subscribe();
    loop {
        tokio::select! {
            res = listener.accept() => {
                match res {
                    Ok((stream, _addr)) => {
                        let state = state.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_client(stream, state).await {
                                tracing::debug!(target: "tutor.serve", error = %e, "socket client ended");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(target: "tutor.serve", error = %e, "socket accept failed");
                    }
                }
            }
            _ = shutdown_rx.recv() => break,
        }
    }

    remove_socket(&path);
    Ok(())
}

#[cfg(not(unix))]
pub async fn serve_socket(path: PathBuf, _state: AppState) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        format!("unix sockets are not available here: {}", path.display()),
    ))
}

/// Status line first, then each appended event line, until the peer hangs up.
#[cfg(unix)]
async fn handle_client(stream: tokio::net::UnixStream, state: AppState) -> std::io::Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::time::MissedTickBehavior;
    use tutor_core::api::{read_raw, EventTail};

    use super::sse::single_line;

    let (mut rd, mut wr) = stream.into_split();
    let mut tail = EventTail::from_end(state.events_path.as_path());

    if let Some(raw) = read_raw(&state.status_path) {
        let mut line = single_line(&raw);
        line.push('\n');
        wr.write_all(line.as_bytes()).await?;
    }

    let mut ticker = tokio::time::interval(state.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut scratch = [0u8; 256];
    loop {
        tokio::select! {
            n = rd.read(&mut scratch) => {
                match n {
                    // input is ignored; EOF or error means the peer is gone
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            _ = ticker.tick() => {
                for mut line in tail.poll() {
                    line.push('\n');
                    wr.write_all(line.as_bytes()).await?;
                }
                wr.flush().await?;
            }
        }
    }
    Ok(())
}

pub fn remove_socket(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(target: "tutor.serve", error = %e, socket = %path.display(), "failed to remove socket");
        }
    }
}
