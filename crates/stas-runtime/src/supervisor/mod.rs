//! Supervisor for the single stas-server child process.
//!
//! The supervisor guarantees a usable, ready process before any request is
//! dispatched, with at most one live process at a time. Readiness is
//! detected from the server's own log stream; crashes are detected lazily
//! on the next use and answered with a restart. Disposal is terminal and
//! suppresses any further restart.

mod shutdown;
mod state;
mod stream;

pub use state::ServerPhase;
pub use stream::READY_MARKER;

use crate::supervisor::state::ServerState;
use crate::supervisor::stream::spawn_stream_reader;
use stas_core::EndpointSettings;
use stas_core::ports::ServerLogSinkPort;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// Immutable launch parameters for the server process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the stas-server executable.
    pub executable: PathBuf,
    /// Models folder passed via `--models_dir`.
    pub models_dir: PathBuf,
    /// Port the server is told to listen on (positional argument).
    pub port: u16,
    /// Pass `--cuda`.
    pub enable_cuda: bool,
    /// Pass `--no-cache`.
    pub disable_cache: bool,
}

impl ServerConfig {
    /// Build the launch config from endpoint settings.
    #[must_use]
    pub fn from_settings(settings: &EndpointSettings) -> Self {
        Self {
            executable: PathBuf::from(&settings.exe_path),
            models_dir: PathBuf::from(&settings.models_path),
            port: settings.server_port,
            enable_cuda: settings.enable_cuda,
            disable_cache: settings.disable_cache,
        }
    }

    /// Fail-fast check of both launch paths, run before any spawn.
    pub fn validate(&self) -> Result<(), SupervisorError> {
        if !self.executable.is_file() {
            return Err(SupervisorError::ExecutableNotFound {
                path: self.executable.clone(),
            });
        }
        if !self.models_dir.is_dir() {
            return Err(SupervisorError::ModelsDirNotFound {
                path: self.models_dir.clone(),
            });
        }
        Ok(())
    }
}

/// How long and how often to poll for readiness.
///
/// The original endpoint waited forever; the timeout here turns a server
/// that never comes up into a reportable error instead of a hang.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessPolicy {
    /// Interval between phase checks.
    pub poll_interval: Duration,
    /// Maximum total wait; `None` restores the original unbounded behavior.
    pub timeout: Option<Duration>,
}

impl Default for ReadinessPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl ReadinessPolicy {
    /// Policy without a deadline.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: None,
        }
    }

    /// Default polling with a custom deadline.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            timeout: Some(timeout),
        }
    }
}

/// Errors from supervisor operations.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// Executable path is configured but the file is missing.
    #[error("stas-server executable not found at {path}")]
    ExecutableNotFound { path: PathBuf },

    /// Models folder is configured but missing.
    #[error("models folder not found at {path}")]
    ModelsDirNotFound { path: PathBuf },

    /// Spawning the child failed.
    #[error("failed to launch stas-server: {source}")]
    Spawn {
        #[source]
        source: io::Error,
    },

    /// The readiness marker never appeared within the policy deadline.
    #[error("stas-server did not become ready within {waited:?}")]
    ReadyTimeout { waited: Duration },

    /// The process died before ever emitting the readiness marker.
    #[error("stas-server exited during startup (exit code {exit_code:?})")]
    ExitedDuringStartup { exit_code: Option<i32> },

    /// The supervisor has been disposed; no restart will occur.
    #[error("supervisor is disposed")]
    Disposed,
}

/// Owns the child process and its lifecycle state machine.
pub struct ServerSupervisor {
    config: ServerConfig,
    policy: ReadinessPolicy,
    log_sink: Option<Arc<dyn ServerLogSinkPort>>,
    state: Arc<Mutex<ServerState>>,
    child: AsyncMutex<Option<Child>>,
}

impl ServerSupervisor {
    /// Create a supervisor, validating the launch paths up front.
    ///
    /// `log_sink` receives every captured output line; pass `None` when
    /// server-message logging is disabled.
    pub fn new(
        config: ServerConfig,
        policy: ReadinessPolicy,
        log_sink: Option<Arc<dyn ServerLogSinkPort>>,
    ) -> Result<Self, SupervisorError> {
        config.validate()?;
        Ok(Self {
            config,
            policy,
            log_sink,
            state: Arc::new(Mutex::new(ServerState::new())),
            child: AsyncMutex::new(None),
        })
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> ServerPhase {
        self.lock_state().phase
    }

    fn lock_state(&self) -> MutexGuard<'_, ServerState> {
        // A reader task can only poison this lock by panicking mid-write;
        // the state itself stays coherent, so recover the guard.
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Make sure a ready server process exists, starting or restarting one
    /// if needed, then wait until readiness is observed.
    pub async fn ensure_ready(&self) -> Result<(), SupervisorError> {
        self.reap_if_exited().await;

        {
            let mut child_guard = self.child.lock().await;
            let phase = self.phase();
            match phase {
                ServerPhase::Disposed => return Err(SupervisorError::Disposed),
                ServerPhase::Unstarted | ServerPhase::Exited => {
                    if phase == ServerPhase::Exited {
                        warn!("translator server process not running, starting a new one");
                    }
                    self.start_locked(&mut child_guard)?;
                }
                ServerPhase::Starting | ServerPhase::Ready => {}
            }
        }

        self.wait_ready().await
    }

    /// Start the server process. No-op when a live process is already
    /// tracked; an error when the supervisor is disposed.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        let mut child_guard = self.child.lock().await;
        match self.phase() {
            ServerPhase::Disposed => Err(SupervisorError::Disposed),
            phase if phase.is_live() => Ok(()),
            _ => self.start_locked(&mut child_guard),
        }
    }

    fn start_locked(&self, child_guard: &mut Option<Child>) -> Result<(), SupervisorError> {
        if child_guard.is_some() {
            return Ok(());
        }

        info!(
            executable = %self.config.executable.display(),
            port = %self.config.port,
            "launching stas-server"
        );

        let mut cmd = Command::new(&self.config.executable);
        cmd.arg(self.config.port.to_string())
            .arg("--models_dir")
            .arg(&self.config.models_dir);
        if self.config.enable_cuda {
            cmd.arg("--cuda");
        }
        if self.config.disable_cache {
            cmd.arg("--no-cache");
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|source| SupervisorError::Spawn { source })?;

        let generation = self.lock_state().begin_start();

        if let Some(stdout) = child.stdout.take() {
            spawn_stream_reader(
                stdout,
                "stdout",
                generation,
                self.state.clone(),
                self.log_sink.clone(),
            );
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_stream_reader(
                stderr,
                "stderr",
                generation,
                self.state.clone(),
                self.log_sink.clone(),
            );
        }

        *child_guard = Some(child);
        Ok(())
    }

    /// Lazily detect an unexpected exit and fold it into the state machine.
    async fn reap_if_exited(&self) {
        let mut child_guard = self.child.lock().await;
        let Some(child) = child_guard.as_mut() else {
            return;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                warn!(%status, "translator server process exited unexpectedly");
                child_guard.take();
                self.lock_state().mark_exited(status.code());
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "failed to poll translator server process");
            }
        }
    }

    /// Cooperative poll until the phase is Ready.
    async fn wait_ready(&self) -> Result<(), SupervisorError> {
        let deadline = self.policy.timeout.map(|t| Instant::now() + t);

        loop {
            match self.phase() {
                ServerPhase::Ready => return Ok(()),
                ServerPhase::Disposed => return Err(SupervisorError::Disposed),
                ServerPhase::Exited => {
                    let exit_code = self.lock_state().exit_code;
                    return Err(SupervisorError::ExitedDuringStartup { exit_code });
                }
                ServerPhase::Unstarted | ServerPhase::Starting => {}
            }

            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                return Err(SupervisorError::ReadyTimeout {
                    waited: self.policy.timeout.unwrap_or_default(),
                });
            }

            sleep(self.policy.poll_interval).await;
            self.reap_if_exited().await;
        }
    }

    /// Enter teardown: terminate and release the tracked process and refuse
    /// any future restart. Safe to call repeatedly.
    pub async fn dispose(&self) {
        self.lock_state().phase = ServerPhase::Disposed;

        let taken = self.child.lock().await.take();
        if let Some(child) = taken {
            debug!("disposing supervised stas-server process");
            if let Err(e) = shutdown::shutdown_child(child).await {
                debug!(error = %e, "error while shutting down stas-server");
            }
        }
    }
}

impl std::fmt::Debug for ServerSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSupervisor")
            .field("config", &self.config)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}
