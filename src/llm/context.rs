//! Gather grounding data for LLM prompts
//!
//! The model never sees the database. It sees a small snapshot of the people,
//! projects and upcoming events a request may refer to, and must answer in
//! terms of those names and ids.

use crate::core::config::GroundingConfig;
use crate::core::types::{Department, EventId, ProjectId, UserId};
use crate::domain::model::User;
use crate::domain::store::{DomainStore, StoreResult};
use crate::llm::schema::IntentKind;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// A user the request may mention
#[derive(Debug, Clone, PartialEq)]
pub struct NamedUser {
    pub id: UserId,
    pub name: String,
    pub department: Option<Department>,
}

/// An open project the request may mention
#[derive(Debug, Clone, PartialEq)]
pub struct NamedProject {
    pub id: ProjectId,
    pub name: String,
}

/// A calendar entry the request may target
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub id: EventId,
    pub title: String,
    pub start: NaiveDateTime,
}

/// Immutable reference snapshot for one request
#[derive(Debug, Clone, PartialEq)]
pub struct GroundingContext {
    /// Reference instant; "today" and relative dates are computed from it
    pub now: NaiveDateTime,
    pub acting_user: NamedUser,
    pub users: Vec<NamedUser>,
    pub projects: Vec<NamedProject>,
    pub events: Vec<EventSummary>,
}

impl GroundingContext {
    /// Create an empty context for testing
    pub fn empty(now: NaiveDateTime, acting_user: NamedUser) -> Self {
        Self {
            now,
            acting_user,
            users: Vec::new(),
            projects: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// Exact, case-sensitive lookup
    pub fn user_by_name(&self, name: &str) -> Option<UserId> {
        self.users.iter().find(|u| u.name == name).map(|u| u.id)
    }

    pub fn has_user(&self, id: UserId) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    /// Exact, case-sensitive lookup
    pub fn project_by_name(&self, name: &str) -> Option<ProjectId> {
        self.projects.iter().find(|p| p.name == name).map(|p| p.id)
    }

    pub fn has_project(&self, id: ProjectId) -> bool {
        self.projects.iter().any(|p| p.id == id)
    }

    pub fn has_event(&self, id: EventId) -> bool {
        self.events.iter().any(|e| e.id == id)
    }

    /// Generate a text summary of the context for LLM prompts
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(&format!(
            "Today: {} ({})\n",
            self.today().format("%Y-%m-%d"),
            self.today().format("%A")
        ));
        s.push_str(&format!(
            "Current time: {}\n",
            self.now.format("%Y-%m-%dT%H:%M")
        ));
        s.push_str(&format!(
            "Requested by: {} (id {})\n",
            self.acting_user.name, self.acting_user.id
        ));

        if !self.users.is_empty() {
            s.push_str("\nUsers (name: id):\n");
            for user in &self.users {
                match user.department {
                    Some(dept) => {
                        s.push_str(&format!("- {}: {} [{}]\n", user.name, user.id, dept.key()))
                    }
                    None => s.push_str(&format!("- {}: {}\n", user.name, user.id)),
                }
            }
        }

        if !self.projects.is_empty() {
            s.push_str("\nOpen projects (name: id):\n");
            for project in &self.projects {
                s.push_str(&format!("- {}: {}\n", project.name, project.id));
            }
        }

        if !self.events.is_empty() {
            s.push_str("\nCalendar events (id | title | start):\n");
            for event in &self.events {
                s.push_str(&format!(
                    "- {} | {} | {}\n",
                    event.id,
                    event.title,
                    event.start.format("%Y-%m-%dT%H:%M")
                ));
            }
        }

        s
    }
}

/// Builds a `GroundingContext` from the domain store
pub struct ContextAssembler<'a> {
    store: &'a dyn DomainStore,
    config: &'a GroundingConfig,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(store: &'a dyn DomainStore, config: &'a GroundingConfig) -> Self {
        Self { store, config }
    }

    /// Read-only; any store error aborts the request
    pub fn assemble(
        &self,
        kind: IntentKind,
        acting_user: &User,
        now: NaiveDateTime,
    ) -> StoreResult<GroundingContext> {
        let users = self
            .store
            .list_users()?
            .into_iter()
            .map(|u| NamedUser {
                id: u.id,
                name: u.username,
                department: u.department,
            })
            .collect();

        let projects = if kind.needs_projects() {
            self.store
                .list_active_projects()?
                .into_iter()
                .map(|p| NamedProject {
                    id: p.id,
                    name: p.name,
                })
                .collect()
        } else {
            Vec::new()
        };

        let events = if kind.needs_events() {
            // An unrepresentable window start means "from the beginning"
            let since = Duration::try_days(self.config.event_lookback_days)
                .and_then(|window| now.checked_sub_signed(window))
                .unwrap_or(NaiveDateTime::MIN);
            self.store
                .list_events_from(since, self.config.event_limit)?
                .into_iter()
                .map(|e| EventSummary {
                    id: e.id,
                    title: e.title,
                    start: e.start,
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(GroundingContext {
            now,
            acting_user: NamedUser {
                id: acting_user.id,
                name: acting_user.username.clone(),
                department: acting_user.department,
            },
            users,
            projects,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Role;
    use crate::domain::memory::MemoryStore;
    use crate::domain::model::{Event, Project, ProjectStatus};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id: UserId(id),
            username: name.into(),
            department: Some(Department::System),
            role: Role::User,
        }
    }

    fn project(id: i64, name: &str, status: ProjectStatus) -> Project {
        Project {
            id: ProjectId(id),
            name: name.into(),
            description: None,
            start_date: None,
            end_date: None,
            status,
            department: None,
        }
    }

    fn event(id: i64, start: NaiveDateTime) -> Event {
        Event {
            id: EventId(id),
            title: format!("Event {}", id),
            description: None,
            start,
            end: None,
            all_day: false,
            location: None,
            creator_id: UserId(1),
            assignee_id: None,
        }
    }

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_user(user(1, "윤경식"));
        store.add_user(user(7, "김철수"));
        store.add_project(project(20, "ERP 구축", ProjectStatus::InProgress));
        store.add_project(project(21, "Old rollout", ProjectStatus::Completed));
        store.add_event(event(30, now() - Duration::days(3)));
        store.add_event(event(31, now() - Duration::hours(12)));
        store.add_event(event(32, now() + Duration::days(2)));
        store
    }

    #[test]
    fn test_task_context_has_users_and_active_projects() {
        let store = seeded_store();
        let config = GroundingConfig::default();
        let ctx = ContextAssembler::new(&store, &config)
            .assemble(IntentKind::CreateTask, &user(1, "윤경식"), now())
            .unwrap();

        assert_eq!(ctx.users.len(), 2);
        assert_eq!(ctx.projects.len(), 1);
        assert_eq!(ctx.projects[0].name, "ERP 구축");
        assert!(ctx.events.is_empty());
    }

    #[test]
    fn test_event_context_is_windowed() {
        let store = seeded_store();
        let config = GroundingConfig::default();
        let ctx = ContextAssembler::new(&store, &config)
            .assemble(IntentKind::EventAction, &user(1, "윤경식"), now())
            .unwrap();

        let ids: Vec<_> = ctx.events.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![31, 32]);
        assert!(ctx.projects.is_empty());
    }

    #[test]
    fn test_event_limit_respected() {
        let store = seeded_store();
        let config = GroundingConfig {
            event_lookback_days: 7,
            event_limit: 2,
        };
        let ctx = ContextAssembler::new(&store, &config)
            .assemble(IntentKind::EventAction, &user(1, "윤경식"), now())
            .unwrap();
        assert_eq!(ctx.events.len(), 2);
    }

    #[test]
    fn test_huge_lookback_covers_all_events() {
        let store = seeded_store();
        let config = GroundingConfig {
            event_lookback_days: i64::MAX,
            event_limit: 30,
        };
        let ctx = ContextAssembler::new(&store, &config)
            .assemble(IntentKind::EventAction, &user(1, "윤경식"), now())
            .unwrap();

        let ids: Vec<_> = ctx.events.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![30, 31, 32]);
    }

    #[test]
    fn test_store_failure_propagates() {
        let store = seeded_store();
        store.set_fail_reads(true);
        let config = GroundingConfig::default();
        let result = ContextAssembler::new(&store, &config).assemble(
            IntentKind::CreateTask,
            &user(1, "윤경식"),
            now(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let mut ctx = GroundingContext::empty(
            now(),
            NamedUser {
                id: UserId(1),
                name: "Admin".into(),
                department: None,
            },
        );
        ctx.users.push(NamedUser {
            id: UserId(3),
            name: "Marcus".into(),
            department: None,
        });

        assert_eq!(ctx.user_by_name("Marcus"), Some(UserId(3)));
        assert_eq!(ctx.user_by_name("marcus"), None);
        assert_eq!(ctx.user_by_name("Marc"), None);
    }

    #[test]
    fn test_context_summary() {
        let store = seeded_store();
        let config = GroundingConfig::default();
        let ctx = ContextAssembler::new(&store, &config)
            .assemble(IntentKind::EventAction, &user(1, "윤경식"), now())
            .unwrap();

        let summary = ctx.summary();
        assert!(summary.contains("Today: 2026-03-10"));
        assert!(summary.contains("김철수: 7"));
        assert!(summary.contains("32 | Event 32"));
    }
}
