use super::*;
use std::io;
use std::sync::Mutex;
use tokio::io::{duplex, AsyncBufReadExt, BufReader, DuplexStream, Lines};

/// The engine's end of an attached client's three pipes.
struct FakeEngine {
    input: Lines<BufReader<DuplexStream>>,
    output: DuplexStream,
    errors: DuplexStream,
}

impl FakeEngine {
    async fn expect(&mut self, line: &str) {
        let got = tokio::time::timeout(Duration::from_secs(5), self.input.next_line())
            .await
            .expect("client went quiet")
            .unwrap();
        assert_eq!(got.as_deref(), Some(line));
    }

    async fn say(&mut self, line: &str) {
        self.output.write_all(format!("{line}\n").as_bytes()).await.unwrap();
    }

    async fn say_bytes(&mut self, bytes: &[u8]) {
        self.output.write_all(bytes).await.unwrap();
    }

    async fn complain(&mut self, line: &str) {
        self.errors.write_all(format!("{line}\n").as_bytes()).await.unwrap();
    }
}

fn quick_config() -> ClientConfig {
    ClientConfig {
        ping_timeout: Some(Duration::from_secs(5)),
        move_timeout: Some(Duration::from_secs(5)),
        poll_interval: Duration::from_millis(10),
    }
}

fn attached_client(config: ClientConfig) -> (EngineClient, FakeEngine) {
    let (client_stdin, engine_stdin) = duplex(4096);
    let (engine_stdout, client_stdout) = duplex(4096);
    let (engine_stderr, client_stderr) = duplex(4096);

    let mut client = EngineClient::new(
        EngineSpec::new("fake", 3),
        Arc::new(EngineRegistry::new()),
        config,
    );
    client.attach(None, client_stdin, client_stdout, client_stderr);

    let engine = FakeEngine {
        input: BufReader::new(engine_stdin).lines(),
        output: engine_stdout,
        errors: engine_stderr,
    };
    (client, engine)
}

#[tokio::test]
async fn new_client_is_unconnected() {
    let client = EngineClient::new(
        "edax:4".parse().unwrap(),
        Arc::new(EngineRegistry::new()),
        ClientConfig::default(),
    );
    assert_eq!(client.state(), ClientState::Unconnected);
    assert_eq!(client.label(), "edax:4");
    assert_eq!(client.my_name(), "edax:4");
    assert!(!client.is_connected());
}

#[tokio::test]
async fn connect_unknown_engine_fails_before_spawning() {
    let mut client = EngineClient::new(
        "missing:2".parse().unwrap(),
        Arc::new(EngineRegistry::new()),
        ClientConfig::default(),
    );
    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, ArenaError::UnknownEngine(ref name) if name == "missing"));
    assert!(err.is_fatal());
    assert_eq!(client.state(), ClientState::Unconnected);
    assert!(!client.is_connected());
}

#[tokio::test]
async fn commands_before_connect_are_rejected() {
    let mut client = EngineClient::new(
        "edax".parse().unwrap(),
        Arc::new(EngineRegistry::new()),
        quick_config(),
    );
    let err = client.set_game("(;GM[Othello];)").await.unwrap_err();
    assert!(matches!(err, ArenaError::NotConnected(_)));
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn set_game_sends_record_then_depth() {
    let (mut client, mut engine) = attached_client(quick_config());
    client.set_game("(;GM[Othello];)").await.unwrap();

    engine.expect("set game (;GM[Othello];)").await;
    engine.expect("set depth 3").await;
    assert_eq!(client.state(), ClientState::GameSet);
}

#[tokio::test]
async fn ping_ignores_other_pong_numbers() {
    let (mut client, mut engine) = attached_client(quick_config());

    let responder = tokio::spawn(async move {
        engine.expect("ping 1").await;
        engine.say("pong 0").await;
        engine.say("pong 11").await;
        engine.say("status searching").await;
        engine.say("pong 1").await;
        engine
    });

    client.ping().await.unwrap();
    // The status line came in before the matching pong, so it was handled.
    assert_eq!(client.status(), "searching");
    assert_eq!(client.state(), ClientState::Connected);
    responder.await.unwrap();
}

#[tokio::test]
async fn ping_counter_increases() {
    let (mut client, mut engine) = attached_client(quick_config());

    let responder = tokio::spawn(async move {
        for n in 1..=3 {
            engine.expect(&format!("ping {n}")).await;
            engine.say(&format!("pong {n}")).await;
        }
        engine
    });

    for _ in 0..3 {
        client.ping().await.unwrap();
    }
    responder.await.unwrap();
}

#[tokio::test]
async fn unanswered_ping_times_out() {
    let config = ClientConfig {
        ping_timeout: Some(Duration::from_millis(100)),
        ..quick_config()
    };
    let (mut client, mut engine) = attached_client(config);

    let responder = tokio::spawn(async move {
        engine.expect("ping 1").await;
        engine.say("pong 2").await;
        engine
    });

    let err = client.ping().await.unwrap_err();
    match err {
        ArenaError::ProtocolTimeout {
            ref engine,
            ref waiting_for,
            after,
        } => {
            assert_eq!(engine, "fake:3");
            assert_eq!(waiting_for, "pong 1");
            assert_eq!(after, Duration::from_millis(100));
        }
        other => panic!("expected a timeout, got {other:?}"),
    }
    assert!(!err.is_fatal());
    drop(responder.await.unwrap());
}

#[tokio::test]
async fn go_returns_announced_move() {
    let (mut client, mut engine) = attached_client(quick_config());

    let responder = tokio::spawn(async move {
        engine.expect("ping 1").await;
        engine.say("set myname Edax").await;
        engine.say("pong 1").await;
        engine.expect("go").await;
        engine.say("status thinking").await;
        engine.say("nodestats 12345 0.01").await;
        engine.say("=== D3/1.50/0.2").await;
        engine
    });

    let response = client.go().await.unwrap();
    assert_eq!(response.action, Some(19));
    assert_eq!(response.move_str, "D3/1.50/0.2");
    assert_eq!(client.my_name(), "Edax");
    assert_eq!(client.label(), "fake:3");
    assert_eq!(client.status(), "thinking");
    assert_eq!(client.state(), ClientState::GameSet);
    responder.await.unwrap();
}

#[tokio::test]
async fn go_discards_stale_move_before_asking() {
    let (mut client, mut engine) = attached_client(quick_config());

    let responder = tokio::spawn(async move {
        // Left over from an earlier request.
        engine.say("=== F5").await;
        engine.expect("ping 1").await;
        engine.say("pong 1").await;
        engine.expect("go").await;
        engine.say("=== PA").await;
        engine
    });

    let response = client.go().await.unwrap();
    assert!(response.is_pass());
    assert_eq!(response.move_str, "PA");
    responder.await.unwrap();
}

#[tokio::test]
async fn unreadable_move_is_reported() {
    let (mut client, mut engine) = attached_client(quick_config());

    let responder = tokio::spawn(async move {
        engine.expect("ping 1").await;
        engine.say("pong 1").await;
        engine.expect("go").await;
        engine.say("=== Z0").await;
        engine
    });

    let err = client.go().await.unwrap_err();
    assert!(matches!(err, ArenaError::InvalidMove { ref spec, .. } if spec == "Z0"));
    responder.await.unwrap();
}

#[tokio::test]
async fn slow_move_times_out() {
    let config = ClientConfig {
        move_timeout: Some(Duration::from_millis(100)),
        ..quick_config()
    };
    let (mut client, mut engine) = attached_client(config);

    let responder = tokio::spawn(async move {
        engine.expect("ping 1").await;
        engine.say("pong 1").await;
        engine.expect("go").await;
        engine.say("status thinking forever").await;
        engine
    });

    let err = client.go().await.unwrap_err();
    assert!(matches!(err, ArenaError::ProtocolTimeout { ref waiting_for, .. } if waiting_for == "=== <move>"));
    assert_eq!(client.state(), ClientState::AwaitingMove);
    drop(responder.await.unwrap());
}

#[tokio::test]
async fn engine_exit_ends_wait() {
    let (mut client, mut engine) = attached_client(quick_config());

    let responder = tokio::spawn(async move {
        engine.expect("ping 1").await;
        engine.complain("segmentation fault").await;
        drop(engine);
    });

    let err = client.ping().await.unwrap_err();
    assert!(matches!(err, ArenaError::EngineExited(ref name) if name == "fake:3"));
    responder.await.unwrap();
}

#[tokio::test]
async fn stderr_chatter_does_not_disturb_protocol() {
    let (mut client, mut engine) = attached_client(quick_config());

    let responder = tokio::spawn(async move {
        engine.complain("loading book...").await;
        engine.expect("ping 1").await;
        engine.complain("book loaded").await;
        engine.say("pong 1").await;
        engine
    });

    client.ping().await.unwrap();
    responder.await.unwrap();
}

#[tokio::test]
async fn announce_move_forwards_raw_spec() {
    let (mut client, mut engine) = attached_client(quick_config());
    let response = MoveResponse::parse("c4/-2.00/0.5").unwrap();

    client.announce_move(&response).await.unwrap();
    engine.expect("move c4/-2.00/0.5").await;
}

#[tokio::test]
async fn disconnect_returns_to_unconnected() {
    let (mut client, _engine) = attached_client(quick_config());
    assert!(client.is_connected());

    client.disconnect().await.unwrap();
    assert_eq!(client.state(), ClientState::Unconnected);
    assert!(!client.is_connected());
    assert!(matches!(client.ping().await, Err(ArenaError::NotConnected(_))));

    // A second disconnect is harmless.
    client.disconnect().await.unwrap();
}

#[tokio::test]
async fn non_utf8_output_is_not_end_of_stream() {
    let (mut client, mut engine) = attached_client(quick_config());

    let responder = tokio::spawn(async move {
        engine.expect("ping 1").await;
        engine.say_bytes(b"status caf\xe9 \xff\n").await;
        engine.say("pong 1").await;
        engine
    });

    client.ping().await.unwrap();
    assert_eq!(client.status(), "caf\u{fffd} \u{fffd}");
    assert!(client.is_connected());
    responder.await.unwrap();
}

/// Log sink shared between a test and its subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn stderr_after_close_is_a_warning() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (mut client, mut engine) = attached_client(quick_config());
    let mut errors = std::mem::replace(&mut engine.errors, duplex(16).0);

    let responder = tokio::spawn(async move {
        engine.expect("ping 1").await;
        // Last words, then the stream goes away before the answer.
        errors.write_all(b"fatal: out of memory\n").await.unwrap();
        drop(errors);
        tokio::time::sleep(Duration::from_millis(50)).await;
        engine.say("pong 1").await;
        engine
    });

    client.ping().await.unwrap();
    responder.await.unwrap();

    let warning = logs
        .contents()
        .lines()
        .find(|line| line.contains("fatal: out of memory"))
        .map(str::to_string)
        .expect("stderr line was logged");
    assert!(warning.contains("WARN"), "logged as {warning}");
}
