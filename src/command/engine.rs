//! Request pipeline: grounding -> model -> schema -> resolution -> execution
//!
//! Each call is one self-contained unit of work. Nothing is cached between
//! requests and the engine adds no locking of its own.

use crate::command::executor::{ActionExecutor, ExecutionOutcome};
use crate::command::resolver::{EntityResolver, ResolutionError, ResolvedAction};
use crate::core::config::EngineConfig;
use crate::core::types::{EntityRef, UserId};
use crate::domain::store::DomainStore;
use crate::llm::context::ContextAssembler;
use crate::llm::invoker::{InvocationError, ModelInvoker, PromptSpec};
use crate::llm::schema::{EventVerb, IntentKind, SchemaRegistry, SchemaViolation};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Request-level failures; per-item problems live in the outcome list
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("grounding data unavailable: {0}")]
    GroundingUnavailable(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] InvocationError),

    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),

    #[error("no target identified for {0:?}")]
    NoTargetIdentified(EventVerb),
}

impl From<ResolutionError> for EngineError {
    fn from(err: ResolutionError) -> Self {
        match err {
            ResolutionError::NoTargetIdentified(verb) => EngineError::NoTargetIdentified(verb),
        }
    }
}

/// Result of one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyReport {
    pub kind: IntentKind,
    /// Meeting minutes or project that owns the batch, if the request has one
    pub header: Option<ExecutionOutcome>,
    /// One entry per attempted item, in input order
    pub outcomes: Vec<ExecutionOutcome>,
    /// Entities created by this request, header first
    pub created: Vec<EntityRef>,
}

impl ApplyReport {
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    pub fn is_fully_applied(&self) -> bool {
        let header_ok = self.header.as_ref().map_or(true, ExecutionOutcome::is_applied);
        header_ok && !self.outcomes.is_empty() && self.applied_count() == self.outcomes.len()
    }
}

/// The interpretation engine; store, model and configuration are injected
pub struct Engine {
    store: Arc<dyn DomainStore>,
    invoker: ModelInvoker,
    config: EngineConfig,
}

impl Engine {
    pub fn new(store: Arc<dyn DomainStore>, invoker: ModelInvoker, config: EngineConfig) -> Self {
        Self {
            store,
            invoker,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Interpret `text` relative to the local wall clock
    pub async fn interpret_and_apply(
        &self,
        kind: IntentKind,
        text: &str,
        acting_user: UserId,
    ) -> Result<ApplyReport, EngineError> {
        let now = chrono::Local::now().naive_local();
        self.interpret_and_apply_at(kind, text, acting_user, now)
            .await
    }

    /// Interpret `text` relative to a fixed reference instant
    pub async fn interpret_and_apply_at(
        &self,
        kind: IntentKind,
        text: &str,
        acting_user: UserId,
        now: NaiveDateTime,
    ) -> Result<ApplyReport, EngineError> {
        tracing::info!(%kind, user = %acting_user, "Interpreting request");

        let actor = self
            .store
            .user(acting_user)
            .map_err(|e| EngineError::GroundingUnavailable(e.to_string()))?
            .ok_or_else(|| {
                EngineError::GroundingUnavailable(format!("unknown user {}", acting_user))
            })?;

        let context = ContextAssembler::new(self.store.as_ref(), &self.config.grounding)
            .assemble(kind, &actor, now)
            .map_err(|e| EngineError::GroundingUnavailable(e.to_string()))?;
        tracing::debug!(
            users = context.users.len(),
            projects = context.projects.len(),
            events = context.events.len(),
            "Grounding assembled"
        );

        let schema = SchemaRegistry::schema(kind);
        let prompt = PromptSpec {
            instruction: schema.instruction.to_string(),
            schema: schema.describe(),
            grounding: context.summary(),
            input: text.to_string(),
        };
        let raw = self.invoker.invoke(&prompt).await.map_err(|e| {
            tracing::warn!("Model call failed: {}", e);
            EngineError::from(e)
        })?;

        let skeleton = schema.validate(&raw).map_err(|e| {
            tracing::warn!("Model output rejected: {}", e);
            EngineError::from(e)
        })?;

        let mut action = EntityResolver::new(&self.config.defaults).resolve(&skeleton, &context)?;
        action.attach_source_text(text);

        let execution = ActionExecutor::new(self.store.as_ref()).execute(&action, &actor);
        let header_created = match &action {
            ResolvedAction::CreatePlan(plan) => plan.existing_project.is_none(),
            _ => true,
        };
        let created = match action {
            ResolvedAction::UpdateEvents { .. } | ResolvedAction::DeleteEvents { .. } => Vec::new(),
            _ => execution
                .header
                .iter()
                .filter(|_| header_created)
                .chain(execution.outcomes.iter())
                .filter(|o| o.is_applied())
                .filter_map(|o| o.target)
                .collect(),
        };

        let report = ApplyReport {
            kind,
            header: execution.header,
            outcomes: execution.outcomes,
            created,
        };
        tracing::info!(
            %kind,
            applied = report.applied_count(),
            total = report.outcomes.len(),
            "Request finished"
        );
        Ok(report)
    }
}
