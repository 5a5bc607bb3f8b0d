//! NBoard engine client.
//!
//! Drives one engine subprocess through the protocol:
//!
//! ```text
//! Unconnected --connect--> Connected --set_game--> GameSet
//!     GameSet --go--> AwaitingPing --pong n--> AwaitingMove --=== mv--> GameSet
//! ```
//!
//! Every `go` starts with a full `ping`/`pong` round trip. Whatever the
//! engine printed since the last move (late status lines, a stale move from
//! an earlier request) is consumed before `go` is sent, so the next `===`
//! line is guaranteed to answer this request.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::Child;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::engine_spec::EngineSpec;
use crate::error::{ArenaError, Result};
use crate::line_reader::LineReader;
use crate::player::Player;
use crate::protocol::{EngineCommand, EngineMessage, MoveResponse, PROTOCOL_VERSION};
use crate::registry::EngineRegistry;

/// How long an engine gets to exit on its own after stdin is closed.
const EXIT_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Unconnected,
    Connected,
    GameSet,
    AwaitingPing,
    AwaitingMove,
}

struct Connection {
    child: Option<Child>,
    stdin: Box<dyn AsyncWrite + Send + Unpin>,
    stdout: LineReader,
    stderr: LineReader,
}

pub struct EngineClient {
    spec: EngineSpec,
    label: String,
    registry: Arc<EngineRegistry>,
    config: ClientConfig,
    my_name: String,
    status: String,
    ping_idx: u64,
    state: ClientState,
    conn: Option<Connection>,
}

impl EngineClient {
    pub fn new(spec: EngineSpec, registry: Arc<EngineRegistry>, config: ClientConfig) -> Self {
        let label = spec.to_string();
        Self {
            spec,
            my_name: label.clone(),
            label,
            registry,
            config,
            status: String::new(),
            ping_idx: 0,
            state: ClientState::Unconnected,
            conn: None,
        }
    }

    pub fn spec(&self) -> &EngineSpec {
        &self.spec
    }

    /// `name:depth`, fixed for the life of the client.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Name the engine reported with `set myname`, or the label until it does.
    pub fn my_name(&self) -> &str {
        &self.my_name
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Spawn the engine and send the handshake.
    ///
    /// An engine missing from the registry fails here, before any process
    /// is started.
    pub async fn connect(&mut self) -> Result<()> {
        if self.conn.is_some() {
            self.disconnect().await?;
        }
        let definition = self.registry.get(&self.spec.name)?;
        let mut command = definition.command(&self.spec.name)?;
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let spawn_error = |source| ArenaError::Spawn {
            engine: self.label.clone(),
            source,
        };
        let mut child = command.spawn().map_err(spawn_error)?;
        let missing = |what: &str| {
            spawn_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("{what} was not captured"),
            ))
        };
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

        info!(engine = %self.label, pid = ?child.id(), "engine started");
        self.attach(Some(child), stdin, stdout, stderr);
        self.send(EngineCommand::Nboard(PROTOCOL_VERSION)).await
    }

    /// Wire the client to an engine's streams and start reading them.
    pub(crate) fn attach<W, R, E>(&mut self, child: Option<Child>, stdin: W, stdout: R, stderr: E)
    where
        W: AsyncWrite + Send + Unpin + 'static,
        R: AsyncRead + Send + Unpin + 'static,
        E: AsyncRead + Send + Unpin + 'static,
    {
        let mut stdout = LineReader::new(stdout);
        let mut stderr = LineReader::new(stderr);
        stdout.start();
        stderr.start();
        self.conn = Some(Connection {
            child,
            stdin: Box::new(stdin),
            stdout,
            stderr,
        });
        self.state = ClientState::Connected;
    }

    /// Start a new game. The engine does not answer.
    pub async fn set_game(&mut self, ggf: &str) -> Result<()> {
        self.send(EngineCommand::SetGame(ggf.to_string())).await?;
        self.send(EngineCommand::SetDepth(self.spec.depth)).await?;
        self.state = ClientState::GameSet;
        Ok(())
    }

    /// Ask the engine for its move.
    pub async fn go(&mut self) -> Result<MoveResponse> {
        self.ping().await?;

        self.state = ClientState::AwaitingMove;
        self.send(EngineCommand::Go).await?;
        let spec = self
            .wait_for("=== <move>", self.config.move_timeout, |message| match message {
                EngineMessage::Move(spec) => Some(spec),
                _ => None,
            })
            .await?;

        let response = MoveResponse::parse(&spec).map_err(|_| ArenaError::InvalidMove {
            engine: self.label.clone(),
            spec,
        })?;
        self.state = ClientState::GameSet;
        Ok(response)
    }

    /// Round trip `ping n` / `pong n`. Only the matching number completes it.
    pub async fn ping(&mut self) -> Result<()> {
        self.ping_idx += 1;
        let n = self.ping_idx;
        let resume = match self.state {
            ClientState::AwaitingPing | ClientState::AwaitingMove => ClientState::GameSet,
            other => other,
        };

        self.state = ClientState::AwaitingPing;
        self.send(EngineCommand::Ping(n)).await?;
        self.wait_for(&format!("pong {n}"), self.config.ping_timeout, |message| {
            (message == EngineMessage::Pong(n)).then_some(())
        })
        .await?;
        self.state = resume;
        Ok(())
    }

    /// Tell the engine which move was just played. The engine does not answer.
    pub async fn announce_move(&mut self, response: &MoveResponse) -> Result<()> {
        self.send(EngineCommand::Move(response.move_str.clone())).await
    }

    /// Close the engine's stdin, give it a moment to exit, then kill it.
    pub async fn disconnect(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        self.state = ClientState::Unconnected;

        let Connection {
            child,
            stdin,
            mut stdout,
            mut stderr,
        } = conn;
        drop(stdin);

        if let Some(mut child) = child {
            match tokio::time::timeout(EXIT_GRACE, child.wait()).await {
                Ok(Ok(status)) => debug!(engine = %self.label, "engine exited with {status}"),
                Ok(Err(e)) => warn!(engine = %self.label, "failed to reap engine: {e}"),
                Err(_) => {
                    warn!(engine = %self.label, "engine ignored end of input, killing it");
                    child.kill().await?;
                }
            }
        }

        while let Some(line) = stderr.try_read_line() {
            debug!(engine = %self.label, "{}", line.trim_end());
        }
        stdout.stop();
        stderr.stop();
        info!(engine = %self.label, "engine disconnected");
        Ok(())
    }

    async fn send(&mut self, command: EngineCommand) -> Result<()> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| ArenaError::NotConnected(self.label.clone()))?;
        let line = command.to_string();
        debug!(engine = %self.label, "send > {line}");
        conn.stdin.write_all(line.as_bytes()).await?;
        conn.stdin.write_all(b"\n").await?;
        conn.stdin.flush().await?;
        Ok(())
    }

    /// Read lines until `extract` accepts one, dispatching every line on the
    /// way so name and status updates are never lost.
    async fn wait_for<T, F>(
        &mut self,
        waiting_for: &str,
        deadline: Option<Duration>,
        mut extract: F,
    ) -> Result<T>
    where
        F: FnMut(EngineMessage) -> Option<T> + Send,
        T: Send,
    {
        let started = Instant::now();
        loop {
            self.drain_stderr();

            let conn = self
                .conn
                .as_mut()
                .ok_or_else(|| ArenaError::NotConnected(self.label.clone()))?;
            let line = conn.stdout.read_line(self.config.poll_interval).await;
            if line.is_none() && conn.stdout.is_exhausted() {
                self.drain_stderr();
                return Err(ArenaError::EngineExited(self.label.clone()));
            }

            if let Some(line) = line {
                let line = line.trim();
                if !line.is_empty() {
                    if let Some(found) = extract(self.receive(line)) {
                        return Ok(found);
                    }
                }
            }

            if let Some(limit) = deadline {
                if started.elapsed() >= limit {
                    return Err(ArenaError::ProtocolTimeout {
                        engine: self.label.clone(),
                        waiting_for: waiting_for.to_string(),
                        after: limit,
                    });
                }
            }
        }
    }

    fn receive(&mut self, line: &str) -> EngineMessage {
        debug!(engine = %self.label, "recv < {line}");
        let message = EngineMessage::parse(line);
        match &message {
            EngineMessage::SetMyName(name) => {
                self.my_name = name.clone();
                debug!(engine = %self.label, "myname={}", self.my_name);
            }
            EngineMessage::Status(status) => {
                self.status = status.clone();
                debug!(engine = %self.label, "status={}", self.status);
            }
            _ => {}
        }
        message
    }

    /// Log whatever the engine wrote to stderr. Output that is still
    /// arriving after the stream closed usually means the engine died.
    fn drain_stderr(&mut self) {
        let Some(conn) = self.conn.as_mut() else {
            return;
        };
        while let Some(line) = conn.stderr.try_read_line() {
            let line = line.trim_end();
            if conn.stderr.is_closed() {
                warn!(engine = %self.label, "{line}");
            } else {
                debug!(engine = %self.label, "{line}");
            }
        }
    }
}

#[async_trait]
impl Player for EngineClient {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn name(&self) -> &str {
        &self.my_name
    }

    async fn connect(&mut self) -> Result<()> {
        EngineClient::connect(self).await
    }

    async fn set_game(&mut self, ggf: &str) -> Result<()> {
        EngineClient::set_game(self, ggf).await
    }

    async fn go(&mut self) -> Result<MoveResponse> {
        EngineClient::go(self).await
    }

    async fn announce_move(&mut self, response: &MoveResponse) -> Result<()> {
        EngineClient::announce_move(self, response).await
    }

    async fn disconnect(&mut self) -> Result<()> {
        EngineClient::disconnect(self).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
