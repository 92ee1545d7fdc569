//! smolder-core - Smoke-test orchestration engine
//!
//! Given a target host and a declarative check list, the engine:
//! - drives one page session per check, concurrently
//! - classifies each outcome as passed, failed, or errored
//! - skips session-dependent checks on local/development hosts
//! - settles the run against an error-tolerance gate

pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod fakes;
pub mod gate;
pub mod policy;
pub mod registry;
pub mod report;
pub mod session;
pub mod spec;
pub mod telemetry;

// Re-export key types
pub use engine::SmokeEngine;
pub use error::{Result, SmokeError};
pub use executor::CheckExecutor;
pub use gate::{ErrorGate, RunVerdict, DEFAULT_ERROR_TOLERANCE};
pub use policy::HostPolicy;
pub use registry::{
    CheckRegistry, CheckVerdict, Evaluator, FnEvaluator, SESSION_TOKEN_CHECK, STATUS_CHECK,
};
pub use report::{Outcome, RunOutcome, RunReport};
pub use session::{PageMetrics, PageProvider, PageSession};
pub use spec::CheckSpec;
pub use telemetry::init_tracing;

/// smolder-core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
