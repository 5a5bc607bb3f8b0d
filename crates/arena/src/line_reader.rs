//! Non-blocking line reads over a blocking byte stream.
//!
//! A background task consumes the stream and queues complete lines, so the
//! caller can poll with a short timeout and go do something else (drain the
//! other stream, check a deadline) when nothing has arrived yet.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

type Source = Box<dyn AsyncRead + Send + Unpin>;

pub struct LineReader {
    source: Option<Source>,
    rx: Option<mpsc::UnboundedReceiver<String>>,
    task: Option<JoinHandle<()>>,
    closed: Arc<AtomicBool>,
    exhausted: bool,
}

impl LineReader {
    pub fn new<R>(stream: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self {
            source: Some(Box::new(stream)),
            rx: None,
            task: None,
            closed: Arc::new(AtomicBool::new(false)),
            exhausted: false,
        }
    }

    /// Start consuming the stream in the background. Later calls do nothing.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> &mut Self {
        let Some(source) = self.source.take() else {
            return self;
        };
        let (tx, rx) = mpsc::unbounded_channel();
        let closed = Arc::clone(&self.closed);
        self.task = Some(tokio::spawn(pump(source, tx, closed)));
        self.rx = Some(rx);
        self
    }

    /// Next complete line, if one shows up within `timeout`.
    ///
    /// Returns immediately with None once the stream is exhausted.
    pub async fn read_line(&mut self, timeout: Duration) -> Option<String> {
        if self.exhausted {
            return None;
        }
        let rx = self.rx.as_mut()?;
        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(_) => None,
        }
    }

    /// Next buffered line without waiting at all.
    pub fn try_read_line(&mut self) -> Option<String> {
        let rx = self.rx.as_mut()?;
        match rx.try_recv() {
            Ok(line) => Some(line),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.exhausted = true;
                None
            }
        }
    }

    /// The stream hit end-of-file. Lines queued before that may still be unread.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Closed and every queued line has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Abort the background task.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for LineReader {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn pump(source: Source, tx: mpsc::UnboundedSender<String>, closed: Arc<AtomicBool>) {
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                if buf.ends_with(b"\n") {
                    buf.pop();
                    if buf.ends_with(b"\r") {
                        buf.pop();
                    }
                }
                // Engines are not always careful about encodings.
                let line = String::from_utf8_lossy(&buf).into_owned();
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::debug!("stream read failed: {e}");
                break;
            }
        }
    }
    // Flag first: whoever sees the channel disconnect must also see `closed`.
    closed.store(true, Ordering::Release);
    drop(tx);
}

#[cfg(test)]
#[path = "line_reader_tests.rs"]
mod line_reader_tests;
