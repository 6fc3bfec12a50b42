//! In-memory domain store
//!
//! Backs the demo binary and the test suites. Every write bumps a mutation
//! counter, and reads or writes can be made to fail on demand.

use crate::core::types::{EventId, MeetingId, ProjectId, TaskId, TemplateId, UserId};
use crate::domain::model::{
    Event, EventPatch, MeetingMinutes, NewEvent, NewMeeting, NewProject, NewTask, NewTemplate,
    Project, ProjectStatus, Task, User, WbsTemplate,
};
use crate::domain::store::{DomainStore, StoreError, StoreResult};
use ahash::AHashMap;
use chrono::NaiveDateTime;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct Tables {
    next_id: i64,
    mutations: usize,
    users: AHashMap<UserId, User>,
    projects: AHashMap<ProjectId, Project>,
    tasks: AHashMap<TaskId, Task>,
    events: AHashMap<EventId, Event>,
    meetings: AHashMap<MeetingId, MeetingMinutes>,
    templates: AHashMap<TemplateId, WbsTemplate>,
}

impl Tables {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn reserve(&mut self, id: i64) {
        self.next_id = self.next_id.max(id);
    }
}

/// Thread-safe store holding everything in hash maps
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_batches: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // === SEEDING (not counted as mutations) ===

    pub fn add_user(&self, user: User) {
        let mut tables = self.tables.write();
        tables.reserve(user.id.0);
        tables.users.insert(user.id, user);
    }

    pub fn add_project(&self, project: Project) {
        let mut tables = self.tables.write();
        tables.reserve(project.id.0);
        tables.projects.insert(project.id, project);
    }

    pub fn add_event(&self, event: Event) {
        let mut tables = self.tables.write();
        tables.reserve(event.id.0);
        tables.events.insert(event.id, event);
    }

    // === FAULT INJECTION ===

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fail only `create_tasks`; single-record writes still succeed
    pub fn set_fail_batches(&self, fail: bool) {
        self.fail_batches.store(fail, Ordering::SeqCst);
    }

    // === INSPECTION ===

    /// Number of successful create/update/delete calls
    pub fn mutation_count(&self) -> usize {
        self.tables.read().mutations
    }

    pub fn tasks(&self) -> Vec<Task> {
        sorted_by_id(self.tables.read().tasks.values().cloned(), |t| t.id.0)
    }

    pub fn events(&self) -> Vec<Event> {
        sorted_by_id(self.tables.read().events.values().cloned(), |e| e.id.0)
    }

    pub fn projects(&self) -> Vec<Project> {
        sorted_by_id(self.tables.read().projects.values().cloned(), |p| p.id.0)
    }

    pub fn meetings(&self) -> Vec<MeetingMinutes> {
        sorted_by_id(self.tables.read().meetings.values().cloned(), |m| m.id.0)
    }

    pub fn templates(&self) -> Vec<WbsTemplate> {
        sorted_by_id(self.tables.read().templates.values().cloned(), |t| t.id.0)
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".into()));
        }
        Ok(())
    }
}

fn sorted_by_id<T>(items: impl Iterator<Item = T>, key: impl Fn(&T) -> i64) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| key(item));
    items
}

fn build_task(id: TaskId, task: NewTask) -> Task {
    Task {
        id,
        title: task.title,
        description: task.description,
        status: task.status,
        department: task.department,
        start_date: task.start_date,
        due_date: task.due_date,
        project_id: task.project_id,
        assignee_ids: task.assignee_ids,
        creator_id: task.creator_id,
        origin: task.origin,
    }
}

impl DomainStore for MemoryStore {
    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.check_read()?;
        Ok(self.tables.read().users.get(&id).cloned())
    }

    fn list_users(&self) -> StoreResult<Vec<User>> {
        self.check_read()?;
        Ok(sorted_by_id(
            self.tables.read().users.values().cloned(),
            |u| u.id.0,
        ))
    }

    fn project(&self, id: ProjectId) -> StoreResult<Option<Project>> {
        self.check_read()?;
        Ok(self.tables.read().projects.get(&id).cloned())
    }

    fn list_active_projects(&self) -> StoreResult<Vec<Project>> {
        self.check_read()?;
        Ok(sorted_by_id(
            self.tables
                .read()
                .projects
                .values()
                .filter(|p| p.is_active())
                .cloned(),
            |p| p.id.0,
        ))
    }

    fn create_project(&self, project: NewProject) -> StoreResult<ProjectId> {
        self.check_write()?;
        let mut tables = self.tables.write();
        let id = ProjectId(tables.allocate());
        tables.projects.insert(
            id,
            Project {
                id,
                name: project.name,
                description: project.description,
                start_date: project.start_date,
                end_date: project.end_date,
                status: ProjectStatus::Scheduled,
                department: project.department,
            },
        );
        tables.mutations += 1;
        Ok(id)
    }

    fn create_task(&self, task: NewTask) -> StoreResult<TaskId> {
        self.check_write()?;
        let mut tables = self.tables.write();
        if let Some(project_id) = task.project_id {
            if !tables.projects.contains_key(&project_id) {
                return Err(StoreError::NotFound {
                    entity: "project",
                    id: project_id.0,
                });
            }
        }
        let id = TaskId(tables.allocate());
        tables.tasks.insert(id, build_task(id, task));
        tables.mutations += 1;
        Ok(id)
    }

    fn create_tasks(&self, tasks: Vec<NewTask>) -> StoreResult<Vec<TaskId>> {
        self.check_write()?;
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("batch commits disabled".into()));
        }
        let mut tables = self.tables.write();

        // Validate the whole batch before inserting anything
        for task in &tasks {
            if let Some(project_id) = task.project_id {
                if !tables.projects.contains_key(&project_id) {
                    return Err(StoreError::NotFound {
                        entity: "project",
                        id: project_id.0,
                    });
                }
            }
        }

        let mut ids = Vec::with_capacity(tasks.len());
        for task in tasks {
            let id = TaskId(tables.allocate());
            tables.tasks.insert(id, build_task(id, task));
            ids.push(id);
        }
        tables.mutations += 1;
        Ok(ids)
    }

    fn event(&self, id: EventId) -> StoreResult<Option<Event>> {
        self.check_read()?;
        Ok(self.tables.read().events.get(&id).cloned())
    }

    fn list_events_from(&self, since: NaiveDateTime, limit: usize) -> StoreResult<Vec<Event>> {
        self.check_read()?;
        let mut events: Vec<Event> = self
            .tables
            .read()
            .events
            .values()
            .filter(|e| e.start >= since)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.start, e.id));
        events.truncate(limit);
        Ok(events)
    }

    fn create_event(&self, event: NewEvent) -> StoreResult<EventId> {
        self.check_write()?;
        let mut tables = self.tables.write();
        let id = EventId(tables.allocate());
        tables.events.insert(
            id,
            Event {
                id,
                title: event.title,
                description: event.description,
                start: event.start,
                end: event.end,
                all_day: event.all_day,
                location: event.location,
                creator_id: event.creator_id,
                assignee_id: event.assignee_id,
            },
        );
        tables.mutations += 1;
        Ok(id)
    }

    fn update_event(&self, id: EventId, patch: &EventPatch) -> StoreResult<()> {
        self.check_write()?;
        let mut tables = self.tables.write();
        let event = tables.events.get_mut(&id).ok_or(StoreError::NotFound {
            entity: "event",
            id: id.0,
        })?;
        patch.apply_to(event);
        tables.mutations += 1;
        Ok(())
    }

    fn delete_event(&self, id: EventId) -> StoreResult<()> {
        self.check_write()?;
        let mut tables = self.tables.write();
        tables.events.remove(&id).ok_or(StoreError::NotFound {
            entity: "event",
            id: id.0,
        })?;
        tables.mutations += 1;
        Ok(())
    }

    fn create_meeting(&self, meeting: NewMeeting) -> StoreResult<MeetingId> {
        self.check_write()?;
        let mut tables = self.tables.write();
        let id = MeetingId(tables.allocate());
        tables.meetings.insert(
            id,
            MeetingMinutes {
                id,
                date: meeting.date,
                time: meeting.time,
                location: meeting.location,
                topic: meeting.topic,
                attendees: meeting.attendees,
                content: meeting.content,
                summary: meeting.summary,
                writer_id: meeting.writer_id,
            },
        );
        tables.mutations += 1;
        Ok(id)
    }

    fn create_template(&self, template: NewTemplate) -> StoreResult<TemplateId> {
        self.check_write()?;
        let mut tables = self.tables.write();
        let id = TemplateId(tables.allocate());
        tables.templates.insert(
            id,
            WbsTemplate {
                id,
                name: template.name,
                category: template.category,
                description: template.description,
                phases: template.phases,
                author_id: template.author_id,
            },
        );
        tables.mutations += 1;
        Ok(id)
    }
}
