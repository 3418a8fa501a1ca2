//! Shared harness for the daemon behavioural and unit suites.

use std::ffi::OsString;
use std::io;
use std::sync::{Arc, Mutex};

use camino::Utf8PathBuf;
use ortho_config::{OrthoConfig, OrthoError};
use tempfile::TempDir;

use wirecmd::Command;
use wirecmd_config::{Config, ListenEndpoint};

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};
use crate::dispatch::ConnectionError;
use crate::lifecycle::LifecycleReporter;

/// Scenario world for the bootstrap suite.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingLifecycleReporter>,
    daemon: Option<Daemon>,
    bootstrap_error: Option<BootstrapError>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            loader: Box::new(UnixSocketConfigLoader::new()),
            reporter: Arc::new(RecordingLifecycleReporter::default()),
            daemon: None,
            bootstrap_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
        self.reset_results();
    }

    /// Installs a loader that succeeds.
    pub fn use_successful_loader(&mut self) {
        self.loader = Box::new(UnixSocketConfigLoader::new());
        self.reset_results();
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.daemon.is_some() || self.bootstrap_error.is_some() {
            return;
        }

        match bootstrap_with(&*self.loader, self.reporter.clone()) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    pub fn daemon(&self) -> Option<&Daemon> {
        self.daemon.as_ref()
    }

    fn reset_results(&mut self) {
        self.daemon = None;
        self.bootstrap_error = None;
    }
}

/// Loader that places a Unix socket under a fresh temporary directory that
/// does not exist yet, so bootstrap has to create it.
pub struct UnixSocketConfigLoader {
    root: TempDir,
}

impl UnixSocketConfigLoader {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("failed to create temporary directory for socket"),
        }
    }

    pub fn socket_path(&self) -> Utf8PathBuf {
        let path = self.root.path().join("run").join("wirecmd.sock");
        Utf8PathBuf::from_path_buf(path).expect("temporary socket path was not valid UTF-8")
    }
}

impl ConfigLoader for UnixSocketConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(Config {
            listen: ListenEndpoint::unix(self.socket_path()),
            ..Config::default()
        })
    }
}

/// Loader that fails by passing an unsupported listen scheme on the CLI.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("wirecmdd"),
            OsString::from("--listen"),
            OsString::from("invalid://socket"),
        ];
        Config::load_from_iter(args)
    }
}

/// Lifecycle events tracked during tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ListenerBound(String),
    AcceptFailed,
    ConnectionOpened,
    HandlerPanicked(String),
    ConnectionClosed(Option<String>),
}

/// Records lifecycle events for assertions.
#[derive(Default)]
pub struct RecordingLifecycleReporter {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingLifecycleReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .push(event);
    }
}

impl LifecycleReporter for RecordingLifecycleReporter {
    fn bootstrap_starting(&self) {
        self.record(LifecycleEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(LifecycleEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(LifecycleEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_bound(&self, endpoint: &ListenEndpoint) {
        self.record(LifecycleEvent::ListenerBound(endpoint.to_string()));
    }

    fn accept_failed(&self, _error: &io::Error) {
        self.record(LifecycleEvent::AcceptFailed);
    }

    fn connection_opened(&self, _peer: &str) {
        self.record(LifecycleEvent::ConnectionOpened);
    }

    fn handler_panicked(&self, _peer: &str, command: &Command, _message: &str) {
        self.record(LifecycleEvent::HandlerPanicked(command.to_string()));
    }

    fn connection_closed(&self, _peer: &str, error: Option<&ConnectionError>) {
        self.record(LifecycleEvent::ConnectionClosed(
            error.map(ToString::to_string),
        ));
    }
}

/// Removes ANSI colour sequences from a reply line.
pub fn strip_ansi(line: &str) -> String {
    let mut plain = String::with_capacity(line.len());
    let mut chars = line.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for terminator in chars.by_ref() {
                if terminator == 'm' {
                    break;
                }
            }
        } else {
            plain.push(ch);
        }
    }
    plain
}
