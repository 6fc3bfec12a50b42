//! Command pipeline
//!
//! IntentSkeleton -> EntityResolver -> ResolvedAction -> ActionExecutor -> outcomes,
//! driven end to end by `Engine`.

pub mod engine;
pub mod executor;
pub mod resolver;

pub use engine::{ApplyReport, Engine, EngineError};
pub use executor::{ActionExecutor, Execution, ExecutionOutcome, OutcomeStatus};
pub use resolver::{EntityResolver, ResolutionError, ResolvedAction};
