//! Supervisor phase machine.
//!
//! All lifecycle transitions funnel through one mutex-guarded state holder
//! so the stream-reader tasks and the readiness poll never see a torn
//! combination of flags.

/// Lifecycle phase of the supervised server process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerPhase {
    /// No process has been started yet.
    Unstarted,
    /// A process is running but has not emitted the readiness marker.
    Starting,
    /// The readiness marker has been observed; requests may be dispatched.
    Ready,
    /// The process exited unexpectedly; a restart happens on next use.
    Exited,
    /// Teardown has begun; no restart will ever occur.
    Disposed,
}

impl ServerPhase {
    /// Whether a process is currently tracked as live.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Starting | Self::Ready)
    }
}

/// Mutable supervisor state, always accessed under its mutex.
#[derive(Debug)]
pub(crate) struct ServerState {
    pub phase: ServerPhase,
    /// Exit code of the last unexpected exit, when the OS reported one.
    pub exit_code: Option<i32>,
    /// Process generation, bumped on every start. Stream readers carry the
    /// generation they were spawned for; a reader still draining a dead
    /// process's pipe must not mark a newer process ready.
    pub generation: u64,
}

impl ServerState {
    pub const fn new() -> Self {
        Self {
            phase: ServerPhase::Unstarted,
            exit_code: None,
            generation: 0,
        }
    }

    /// Enter the Starting phase for a freshly spawned process and return
    /// the new generation number its stream readers must carry.
    pub fn begin_start(&mut self) -> u64 {
        self.phase = ServerPhase::Starting;
        self.exit_code = None;
        self.generation += 1;
        self.generation
    }

    /// Record an observed unexpected exit. Liveness going away forces
    /// readiness back off. Disposal wins over anything observed later.
    pub fn mark_exited(&mut self, exit_code: Option<i32>) {
        if self.phase != ServerPhase::Disposed {
            self.phase = ServerPhase::Exited;
            self.exit_code = exit_code;
        }
    }

    /// Flip Starting to Ready. Idempotent, and ignored entirely when the
    /// marker comes from a stale generation's output or any phase other
    /// than Starting.
    pub fn mark_ready(&mut self, generation: u64) -> bool {
        if self.phase == ServerPhase::Starting && self.generation == generation {
            self.phase = ServerPhase::Ready;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_ready_only_from_starting() {
        let mut state = ServerState::new();
        assert!(!state.mark_ready(0));
        let generation = state.begin_start();
        assert!(state.mark_ready(generation));
        // Second marker line is a no-op.
        assert!(!state.mark_ready(generation));
        assert_eq!(state.phase, ServerPhase::Ready);
    }

    #[test]
    fn test_exit_resets_readiness() {
        let mut state = ServerState::new();
        state.phase = ServerPhase::Ready;
        state.mark_exited(Some(1));
        assert_eq!(state.phase, ServerPhase::Exited);
        assert_eq!(state.exit_code, Some(1));
    }

    #[test]
    fn test_stale_generation_cannot_mark_ready() {
        let mut state = ServerState::new();
        let old = state.begin_start();
        state.mark_exited(Some(1));
        let new = state.begin_start();
        assert!(!state.mark_ready(old));
        assert_eq!(state.phase, ServerPhase::Starting);
        assert!(state.mark_ready(new));
    }

    #[test]
    fn test_disposal_is_terminal() {
        let mut state = ServerState::new();
        let generation = state.begin_start();
        state.phase = ServerPhase::Disposed;
        state.mark_exited(Some(0));
        assert_eq!(state.phase, ServerPhase::Disposed);
        assert!(!state.mark_ready(generation));
    }

    #[test]
    fn test_liveness() {
        assert!(ServerPhase::Starting.is_live());
        assert!(ServerPhase::Ready.is_live());
        assert!(!ServerPhase::Unstarted.is_live());
        assert!(!ServerPhase::Exited.is_live());
        assert!(!ServerPhase::Disposed.is_live());
    }
}
