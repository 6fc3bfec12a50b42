//! Domain store interface consumed by the engine
//!
//! The relational backend lives outside this crate. Implementations must
//! give per-call consistency; `create_tasks` must be all-or-nothing.

use crate::core::types::{EventId, MeetingId, ProjectId, TaskId, TemplateId, UserId};
use crate::domain::model::{
    Event, EventPatch, NewEvent, NewMeeting, NewProject, NewTask, NewTemplate, Project, User,
};
use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("write rejected: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Read/write access to the business entities
pub trait DomainStore: Send + Sync {
    fn user(&self, id: UserId) -> StoreResult<Option<User>>;
    fn list_users(&self) -> StoreResult<Vec<User>>;

    fn project(&self, id: ProjectId) -> StoreResult<Option<Project>>;
    /// Projects whose status is not `Completed`
    fn list_active_projects(&self) -> StoreResult<Vec<Project>>;
    fn create_project(&self, project: NewProject) -> StoreResult<ProjectId>;

    fn create_task(&self, task: NewTask) -> StoreResult<TaskId>;
    /// Persist several tasks in one commit; either all are saved or none
    fn create_tasks(&self, tasks: Vec<NewTask>) -> StoreResult<Vec<TaskId>>;

    fn event(&self, id: EventId) -> StoreResult<Option<Event>>;
    /// Events starting at or after `since`, earliest first, at most `limit`
    fn list_events_from(&self, since: NaiveDateTime, limit: usize) -> StoreResult<Vec<Event>>;
    fn create_event(&self, event: NewEvent) -> StoreResult<EventId>;
    fn update_event(&self, id: EventId, patch: &EventPatch) -> StoreResult<()>;
    fn delete_event(&self, id: EventId) -> StoreResult<()>;

    fn create_meeting(&self, meeting: NewMeeting) -> StoreResult<MeetingId>;

    fn create_template(&self, template: NewTemplate) -> StoreResult<TemplateId>;
}
