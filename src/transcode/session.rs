use std::collections::VecDeque;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::error::Error;
use crate::transcode::EncoderSettings;

/// Upper bound on a single chunk read from the encoder's stdout.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Encoder stderr lines kept for the log line on abnormal exit.
const STDERR_TAIL_LINES: usize = 8;

/// Stops the encoder of one session. Cheap to clone, safe to call any
/// number of times from any task or thread.
#[derive(Debug, Clone)]
pub struct Canceller {
    token: CancellationToken,
}

impl Canceller {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Resolves once the encoder process has exited and been reaped.
#[derive(Debug, Clone)]
pub struct ExitWatcher {
    reaped: watch::Receiver<bool>,
}

impl ExitWatcher {
    pub async fn wait(&mut self) {
        // A dropped sender means the supervisor is gone, which only happens
        // after it has reaped the child.
        let _ = self.reaped.wait_for(|reaped| *reaped).await;
    }

    pub fn is_reaped(&self) -> bool {
        *self.reaped.borrow()
    }
}

/// One running encoder and its stdout, streamed as a chunked response body.
///
/// The child process is owned by a supervisor task that kills it on
/// cancellation and reaps it on every exit path. Dropping the session
/// cancels it, so a client that goes away takes its encoder with it.
pub struct TranscodeSession {
    label: String,
    pid: Option<u32>,
    output: ReaderStream<ChildStdout>,
    token: CancellationToken,
    reaped: watch::Receiver<bool>,
    bytes_sent: u64,
    _cancel_on_drop: DropGuard,
}

impl TranscodeSession {
    /// Start transcoding `source` with the configured encoder.
    pub async fn start(settings: &EncoderSettings, source: &Path) -> Result<Self, Error> {
        match tokio::fs::metadata(source).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => return Err(Error::SourceNotFound(source.to_path_buf())),
        }

        let mut command = Command::new(&settings.encoder);
        command.args(settings.args(source));
        Self::spawn(command, source.display().to_string()).map_err(|e| {
            Error::EncoderStartFailed {
                encoder: settings.encoder.clone(),
                source: e,
            }
        })
    }

    /// Spawn `command` as an encoder. Stdin is closed and both output
    /// streams are piped; whatever the command prints on stdout becomes
    /// the session's output.
    pub fn spawn(mut command: Command, label: impl Into<String>) -> io::Result<Self> {
        let label = label.into();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn()?;
        let pid = child.id();
        let (stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                // Dropping the child kills it; tokio reaps it in the background.
                let _ = child.start_kill();
                return Err(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "encoder output pipes were not created",
                ));
            }
        };

        let token = CancellationToken::new();
        let (reaped_tx, reaped_rx) = watch::channel(false);
        let stderr_task = tokio::spawn(drain_stderr(stderr, label.clone()));
        tokio::spawn(supervise(
            child,
            token.clone(),
            stderr_task,
            reaped_tx,
            label.clone(),
        ));

        tracing::info!("Transcode started (pid {:?}): {}", pid, label);
        Ok(Self {
            label,
            pid,
            output: ReaderStream::with_capacity(stdout, CHUNK_SIZE),
            _cancel_on_drop: token.clone().drop_guard(),
            token,
            reaped: reaped_rx,
            bytes_sent: 0,
        })
    }

    /// OS process id of the encoder, if it was still running at spawn time.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn canceller(&self) -> Canceller {
        Canceller {
            token: self.token.clone(),
        }
    }

    pub fn exit_watcher(&self) -> ExitWatcher {
        ExitWatcher {
            reaped: self.reaped.clone(),
        }
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Next chunk of encoder output; `None` once the encoder is done or
    /// the session was cancelled.
    pub async fn next_chunk(&mut self) -> Option<io::Result<Bytes>> {
        self.next().await
    }
}

impl Stream for TranscodeSession {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.token.is_cancelled() {
            return Poll::Ready(None);
        }
        let polled = Pin::new(&mut self.output).poll_next(cx);
        if let Poll::Ready(Some(Ok(chunk))) = &polled {
            self.bytes_sent += chunk.len() as u64;
        }
        polled
    }
}

impl Drop for TranscodeSession {
    fn drop(&mut self) {
        tracing::debug!(
            "Transcode body closed after {} bytes: {}",
            self.bytes_sent,
            self.label
        );
    }
}

/// Own the child until it is gone: wait for a natural exit or kill it on
/// cancellation, reap it and publish that, then log the outcome.
async fn supervise(
    mut child: Child,
    token: CancellationToken,
    stderr_task: JoinHandle<VecDeque<String>>,
    reaped: watch::Sender<bool>,
    label: String,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        _ = token.cancelled() => {
            tracing::debug!("Stopping encoder: {}", label);
            if let Err(e) = child.start_kill() {
                tracing::warn!("Failed to kill encoder for {}: {}", label, e);
            }
            child.wait().await
        }
    };

    // Reaped now. A grandchild may still hold stderr open, so the tail
    // comes after the watchers hear about it.
    let _ = reaped.send(true);

    let tail = stderr_task.await.unwrap_or_default();
    match status {
        Ok(status) if status.success() => tracing::info!("Transcode finished: {}", label),
        Ok(status) if token.is_cancelled() => {
            tracing::info!("Transcode stopped ({}): {}", status, label)
        }
        Ok(status) => tracing::warn!(
            "Encoder exited with {} for {}: {}",
            status,
            label,
            tail.iter().cloned().collect::<Vec<_>>().join(" | ")
        ),
        Err(e) => tracing::error!("Failed to reap encoder for {}: {}", label, e),
    }
}

/// Read stderr to EOF so the encoder never blocks on a full pipe. Lines are
/// logged at debug level; the last few are returned for diagnostics.
async fn drain_stderr(stderr: ChildStderr, label: String) -> VecDeque<String> {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim_end().to_string();
                if line.is_empty() {
                    continue;
                }
                tracing::debug!("encoder [{}]: {}", label, line);
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            Err(e) => {
                tracing::debug!("Encoder stderr closed for {}: {}", label, e);
                break;
            }
        }
    }
    tail
}
