//! Everything that talks to, or about, the generative model
//!
//! context -> schema -> invoker -> backend

pub mod backend;
pub mod client;
pub mod context;
pub mod invoker;
pub mod schema;

pub use backend::{BackendError, GenerativeBackend};
pub use context::{ContextAssembler, GroundingContext};
pub use invoker::{InvocationError, ModelInvoker, PromptSpec};
pub use schema::{IntentKind, IntentSkeleton, SchemaRegistry, SchemaViolation};
