//! Persisted business entities and their creation/patch payloads

use crate::core::types::{
    Department, EventId, MeetingId, ProjectId, Role, TaskId, TemplateId, UserId,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub department: Option<Department>,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ProjectStatus,
    pub department: Option<Department>,
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.status != ProjectStatus::Completed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub department: Option<Department>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Lenient parse of the status labels used by the task board
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "todo" => Some(TaskStatus::Todo),
            "inprogress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

/// Where a task came from, for traceability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskOrigin {
    /// A direct "create a task" request
    Command,
    /// An action item extracted from meeting minutes
    Meeting(MeetingId),
    /// A step of a generated project plan
    Plan(ProjectId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub department: Option<Department>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub project_id: Option<ProjectId>,
    pub assignee_ids: Vec<UserId>,
    pub creator_id: UserId,
    pub origin: TaskOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub department: Option<Department>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub project_id: Option<ProjectId>,
    pub assignee_ids: Vec<UserId>,
    pub creator_id: UserId,
    pub origin: TaskOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: Option<String>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    pub location: Option<String>,
    pub creator_id: UserId,
    pub assignee_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    pub location: Option<String>,
    pub creator_id: UserId,
    pub assignee_id: Option<UserId>,
}

/// Partial event update; `None` leaves the stored field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub all_day: Option<bool>,
    pub location: Option<String>,
    pub assignee_id: Option<UserId>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == EventPatch::default()
    }

    pub fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(end) = self.end {
            event.end = Some(end);
        }
        if let Some(all_day) = self.all_day {
            event.all_day = all_day;
        }
        if let Some(location) = &self.location {
            event.location = Some(location.clone());
        }
        if let Some(assignee) = self.assignee_id {
            event.assignee_id = Some(assignee);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingMinutes {
    pub id: MeetingId,
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: Option<String>,
    pub topic: String,
    pub attendees: Vec<String>,
    /// Raw notes as submitted
    pub content: String,
    pub summary: Option<String>,
    pub writer_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeeting {
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: Option<String>,
    pub topic: String,
    pub attendees: Vec<String>,
    pub content: String,
    pub summary: Option<String>,
    pub writer_id: UserId,
}

/// One step of a work-breakdown template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateTask {
    pub title: String,
    pub description: Option<String>,
    pub estimated_days: i64,
    pub is_core: bool,
    pub checklist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePhase {
    pub phase_name: String,
    pub tasks: Vec<TemplateTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WbsTemplate {
    pub id: TemplateId,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub phases: Vec<TemplatePhase>,
    pub author_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub phases: Vec<TemplatePhase>,
    pub author_id: UserId,
}
