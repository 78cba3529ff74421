use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::RunnerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineTap {
    pub stream: StreamKind,
    pub line: String,
}

/// Read `reader` line by line (final partial line included) and forward each
/// line to the consumer. With `echo` the raw bytes are copied to the matching
/// parent stream first.
pub(crate) fn pump<R>(
    reader: R,
    stream: StreamKind,
    tx: mpsc::Sender<LineTap>,
    echo: bool,
) -> JoinHandle<Result<(), RunnerError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::with_capacity(4096);
        let mut consumer_gone = false;

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|source| RunnerError::StreamIo {
                    stream: stream.as_str(),
                    source,
                })?;
            if n == 0 {
                break;
            }

            if echo {
                echo_bytes(stream, &buf).await;
            }

            if consumer_gone {
                continue;
            }
            let line = String::from_utf8_lossy(strip_eol(&buf)).into_owned();
            if tx.send(LineTap { stream, line }).await.is_err() {
                // keep draining so the child never blocks on a full pipe
                consumer_gone = true;
            }
        }
        Ok(())
    })
}

fn strip_eol(buf: &[u8]) -> &[u8] {
    let mut end = buf.len();
    if end > 0 && buf[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && buf[end - 1] == b'\r' {
        end -= 1;
    }
    &buf[..end]
}

async fn echo_bytes(stream: StreamKind, bytes: &[u8]) {
    let res = match stream {
        StreamKind::Stdout => {
            let mut out = tokio::io::stdout();
            match out.write_all(bytes).await {
                Ok(()) => out.flush().await,
                Err(e) => Err(e),
            }
        }
        StreamKind::Stderr => {
            let mut err = tokio::io::stderr();
            match err.write_all(bytes).await {
                Ok(()) => err.flush().await,
                Err(e) => Err(e),
            }
        }
    };
    if let Err(e) = res {
        tracing::trace!(target: "tutor.runner", stream = stream.as_str(), error = %e, "echo failed");
    }
}
