//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Primary key of a user row
    UserId
);
entity_id!(
    /// Primary key of a project row
    ProjectId
);
entity_id!(TaskId);
entity_id!(EventId);
entity_id!(MeetingId);
entity_id!(TemplateId);

/// Typed reference to any entity the engine can create or touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Project(ProjectId),
    Task(TaskId),
    Event(EventId),
    Meeting(MeetingId),
    Template(TemplateId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityRef::Project(id) => write!(f, "project#{}", id),
            EntityRef::Task(id) => write!(f, "task#{}", id),
            EntityRef::Event(id) => write!(f, "event#{}", id),
            EntityRef::Meeting(id) => write!(f, "meeting#{}", id),
            EntityRef::Template(id) => write!(f, "template#{}", id),
        }
    }
}

/// Business division a user, project or task belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    System,
    Distribution,
    Management,
}

impl Department {
    /// Korean display label used throughout the UI
    pub fn label(&self) -> &'static str {
        match self {
            Department::System => "시스템사업부",
            Department::Distribution => "유통사업부",
            Department::Management => "경영지원팀",
        }
    }

    /// Accepts either the English key or the Korean label
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        [Department::System, Department::Distribution, Department::Management]
            .into_iter()
            .find(|d| value.eq_ignore_ascii_case(d.key()) || value == d.label())
    }

    pub fn key(&self) -> &'static str {
        match self {
            Department::System => "System",
            Department::Distribution => "Distribution",
            Department::Management => "Management",
        }
    }
}

/// Access level of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}
