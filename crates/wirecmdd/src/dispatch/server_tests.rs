//! Tests for the accept loop and connection tasks.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use wirecmd::Command;
use wirecmd_config::{Config, ListenEndpoint};

use crate::bootstrap::BootstrapError;
use crate::lifecycle::LifecycleReporter;
use crate::transport::ConnectionStream;

use super::server::{Acceptor, accept_connections};
use super::{CommandHandler, ConnectionError, Dispatcher, ServeError, serve};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Replies with the command text, panicking on `boom`.
fn echo_handler() -> Arc<dyn CommandHandler> {
    Arc::new(|command: &Command| {
        let text = command.to_string();
        if text == "boom" {
            panic!("handler asked to fail");
        }
        command
            .respond(format!("{text}\n").as_bytes())
            .expect("respond to peer");
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Closed {
    Cleanly,
    TooLarge,
    Panicked(String),
    Other(String),
}

#[derive(Default)]
struct RecordingReporter {
    panics: Mutex<Vec<String>>,
    closed: Mutex<Vec<Closed>>,
    accept_failures: Mutex<Vec<String>>,
}

impl RecordingReporter {
    fn closed(&self) -> Vec<Closed> {
        self.closed.lock().expect("closed lock").clone()
    }

    fn accept_failures(&self) -> Vec<String> {
        self.accept_failures
            .lock()
            .expect("accept failures lock")
            .clone()
    }

    fn panics(&self) -> Vec<String> {
        self.panics.lock().expect("panics lock").clone()
    }

    fn wait_for_close(&self, expected: &Closed) {
        let deadline = Instant::now() + TIMEOUT;
        while !self.closed().contains(expected) {
            assert!(
                Instant::now() < deadline,
                "no {expected:?} close recorded, got {:?}",
                self.closed()
            );
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl LifecycleReporter for RecordingReporter {
    fn bootstrap_starting(&self) {}

    fn bootstrap_succeeded(&self, _config: &Config) {}

    fn bootstrap_failed(&self, _error: &BootstrapError) {}

    fn listener_bound(&self, _endpoint: &ListenEndpoint) {}

    fn accept_failed(&self, error: &io::Error) {
        self.accept_failures
            .lock()
            .expect("accept failures lock")
            .push(error.to_string());
    }

    fn connection_opened(&self, _peer: &str) {}

    fn handler_panicked(&self, _peer: &str, command: &Command, _message: &str) {
        self.panics
            .lock()
            .expect("panics lock")
            .push(command.to_string());
    }

    fn connection_closed(&self, _peer: &str, error: Option<&ConnectionError>) {
        let closed = match error {
            None => Closed::Cleanly,
            Some(ConnectionError::RecordTooLarge { .. }) => Closed::TooLarge,
            Some(ConnectionError::HandlerPanicked { message }) => {
                Closed::Panicked(message.clone())
            }
            Some(other) => Closed::Other(other.to_string()),
        };
        self.closed.lock().expect("closed lock").push(closed);
    }
}

struct Running {
    addr: SocketAddr,
    reporter: Arc<RecordingReporter>,
}

impl Running {
    fn connect(&self) -> TcpStream {
        let stream = TcpStream::connect(self.addr).expect("connect to dispatcher");
        stream
            .set_read_timeout(Some(TIMEOUT))
            .expect("set read timeout");
        stream
    }

    /// Sends `payload`, closes the write half and collects everything the
    /// daemon writes back before closing.
    fn exchange(&self, payload: &[u8]) -> Vec<u8> {
        let mut stream = self.connect();
        stream.write_all(payload).expect("write payload");
        stream.shutdown(Shutdown::Write).expect("close write half");
        let mut received = Vec::new();
        stream.read_to_end(&mut received).expect("read replies");
        received
    }
}

fn start(max_record_bytes: usize) -> Running {
    let reporter = Arc::new(RecordingReporter::default());
    let dispatcher = Dispatcher::bind(&ListenEndpoint::tcp("127.0.0.1", 0), echo_handler())
        .expect("bind dispatcher")
        .with_reporter(reporter.clone())
        .with_max_record_bytes(max_record_bytes);
    let addr = dispatcher.local_addr().expect("tcp dispatcher has an address");
    thread::spawn(move || dispatcher.run());
    Running { addr, reporter }
}

#[fixture]
fn running() -> Running {
    start(64)
}

#[rstest]
fn statements_on_one_connection_run_in_order(running: Running) {
    let replies = running.exchange(b"one; two\n;;three\n");
    assert_eq!(replies, b"one\ntwo\nthree\n");
    running.reporter.wait_for_close(&Closed::Cleanly);
}

#[rstest]
fn carriage_returns_are_stripped_from_records(running: Running) {
    let replies = running.exchange(b"web -repeat=2\r\n");
    assert_eq!(replies, b"web repeat 2\n");
}

#[rstest]
fn partial_final_record_is_dispatched(running: Running) {
    let replies = running.exchange(b"first\ntail");
    assert_eq!(replies, b"first\ntail\n");
}

#[rstest]
fn replies_reach_only_the_originating_connection(running: Running) {
    let mut alpha = running.connect();
    let mut beta = running.connect();

    alpha.write_all(b"alpha\n").expect("write alpha");
    beta.write_all(b"beta\n").expect("write beta");
    alpha.shutdown(Shutdown::Write).expect("close alpha");
    beta.shutdown(Shutdown::Write).expect("close beta");

    let mut alpha_replies = String::new();
    let mut beta_replies = String::new();
    alpha
        .read_to_string(&mut alpha_replies)
        .expect("read alpha");
    beta.read_to_string(&mut beta_replies).expect("read beta");

    assert_eq!(alpha_replies, "alpha\n");
    assert_eq!(beta_replies, "beta\n");
}

#[rstest]
fn handler_panic_closes_only_its_connection(running: Running) {
    let mut survivor = running.connect();
    survivor.write_all(b"before\n").expect("write survivor");

    let replies = running.exchange(b"boom\n");
    assert!(replies.is_empty(), "panicking connection replied {replies:?}");
    running
        .reporter
        .wait_for_close(&Closed::Panicked(String::from("handler asked to fail")));
    assert_eq!(running.reporter.panics(), vec![String::from("boom")]);

    survivor.write_all(b"after\n").expect("write survivor again");
    survivor
        .shutdown(Shutdown::Write)
        .expect("close survivor write half");
    let mut received = String::new();
    survivor
        .read_to_string(&mut received)
        .expect("read survivor replies");
    assert_eq!(received, "before\nafter\n");

    assert_eq!(running.exchange(b"later\n"), b"later\n");
}

#[rstest]
fn handler_panic_discards_the_remaining_statements(running: Running) {
    let mut stream = running.connect();
    stream
        .write_all(b"boom; after\nlater\n")
        .expect("write statements");

    let mut received = Vec::new();
    // Unread statements may make the daemon reset the connection.
    let _ = stream.read_to_end(&mut received);
    assert!(received.is_empty(), "replies after the panic: {received:?}");
    running
        .reporter
        .wait_for_close(&Closed::Panicked(String::from("handler asked to fail")));
    assert_eq!(running.reporter.panics(), vec![String::from("boom")]);
}

#[rstest]
fn oversized_record_closes_the_connection() {
    let running = start(8);
    let mut stream = running.connect();
    stream
        .write_all(b"0123456789abcdef\n")
        .expect("write oversized record");

    let mut received = Vec::new();
    // The daemon may reset the connection since the record was left unread.
    let _ = stream.read_to_end(&mut received);
    assert!(received.is_empty());
    running.reporter.wait_for_close(&Closed::TooLarge);

    assert_eq!(running.exchange(b"short\n"), b"short\n");
}

struct FailingAcceptor {
    endpoint: ListenEndpoint,
}

impl Acceptor for FailingAcceptor {
    fn endpoint(&self) -> &ListenEndpoint {
        &self.endpoint
    }

    fn accept(&self) -> io::Result<ConnectionStream> {
        Err(io::Error::other("listener closed"))
    }
}

#[rstest]
fn failed_accept_stops_the_dispatcher() {
    let acceptor = FailingAcceptor {
        endpoint: ListenEndpoint::tcp("127.0.0.1", 7000),
    };
    let recording = Arc::new(RecordingReporter::default());
    let reporter: Arc<dyn LifecycleReporter> = recording.clone();

    let error = accept_connections(&acceptor, &echo_handler(), &reporter, 64)
        .expect_err("accept failure stops the loop");

    match error {
        ServeError::Accept { endpoint, source } => {
            assert_eq!(endpoint, "tcp://127.0.0.1:7000");
            assert_eq!(source.to_string(), "listener closed");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(
        recording.accept_failures(),
        vec![String::from("listener closed")]
    );
    assert!(recording.closed().is_empty());
}

#[rstest]
#[case("")]
#[case("ftp://localhost:21")]
#[case("localhost:http")]
fn serve_rejects_invalid_addresses(#[case] address: &str) {
    let error = serve(address, |_: &Command| {}).expect_err("address must be rejected");
    assert!(
        matches!(error, ServeError::InvalidAddress { .. }),
        "unexpected error: {error}"
    );
}

#[rstest]
fn bind_reports_ports_in_use() {
    let reserved = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("reserve port");
    let port = reserved.local_addr().expect("local addr").port();

    let error = Dispatcher::bind(&ListenEndpoint::tcp("127.0.0.1", port), echo_handler())
        .expect_err("port already bound");
    assert!(matches!(error, ServeError::Listener(_)));
}

#[cfg(unix)]
#[rstest]
fn serves_unix_domain_sockets() {
    use std::os::unix::net::UnixStream;

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("wirecmd.sock");
    let endpoint = ListenEndpoint::unix(path.to_str().expect("utf-8 temp path"));
    let dispatcher = Dispatcher::bind(&endpoint, echo_handler()).expect("bind unix dispatcher");
    assert!(dispatcher.local_addr().is_none());
    thread::spawn(move || dispatcher.run());

    let mut stream = UnixStream::connect(&path).expect("connect unix client");
    stream
        .set_read_timeout(Some(TIMEOUT))
        .expect("set read timeout");
    stream.write_all(b"over unix\n").expect("write");
    stream.shutdown(Shutdown::Write).expect("close write half");
    let mut received = String::new();
    stream.read_to_string(&mut received).expect("read");
    assert_eq!(received, "over unix\n");
}
