//! Process runtime for the stas translation server.
//!
//! Two pieces live here:
//!
//! - [`supervisor::ServerSupervisor`] — owns the single child process:
//!   spawning, readiness detection from its log stream, lazy crash
//!   detection, restart and disposal.
//! - [`endpoint::TranslationEndpoint`] — the per-call orchestrator wiring
//!   the supervisor, the codec and the transport port together.

pub mod endpoint;
pub mod supervisor;

pub use endpoint::{EndpointError, TranslationEndpoint};
pub use supervisor::{
    ReadinessPolicy, ServerConfig, ServerPhase, ServerSupervisor, SupervisorError,
};
