//! Action execution - applies resolved actions to the domain store
//!
//! One outcome per attempted item, in input order. Items are independent:
//! a skip or failure on one never stops its siblings. Batches of tasks go
//! through a single `create_tasks` commit.

use crate::command::resolver::{
    BatchItem, ResolvedAction, ResolvedEvent, ResolvedMeeting, ResolvedPlan, ResolvedTask,
    ResolvedTemplate,
};
use crate::core::types::{Department, EntityRef, EventId, ProjectId};
use crate::domain::model::{
    Event, EventPatch, NewEvent, NewMeeting, NewProject, NewTask, NewTemplate, TaskOrigin, TaskStatus,
    TemplatePhase, TemplateTask, User,
};
use crate::domain::store::DomainStore;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Applied,
    /// The actor neither created the target nor is an admin
    SkippedUnauthorized,
    SkippedInvalid(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Created or touched entity; `None` when nothing could be identified
    pub target: Option<EntityRef>,
    pub label: String,
    pub status: OutcomeStatus,
}

impl ExecutionOutcome {
    fn applied(target: EntityRef, label: impl Into<String>) -> Self {
        Self {
            target: Some(target),
            label: label.into(),
            status: OutcomeStatus::Applied,
        }
    }

    fn new(target: Option<EntityRef>, label: impl Into<String>, status: OutcomeStatus) -> Self {
        Self {
            target,
            label: label.into(),
            status,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.status == OutcomeStatus::Applied
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self
            .target
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".into());
        match &self.status {
            OutcomeStatus::Applied => write!(f, "[applied] {} {}", target, self.label),
            OutcomeStatus::SkippedUnauthorized => {
                write!(f, "[unauthorized] {} {}", target, self.label)
            }
            OutcomeStatus::SkippedInvalid(reason) => {
                write!(f, "[skipped] {} {} ({})", target, self.label, reason)
            }
            OutcomeStatus::Failed(reason) => {
                write!(f, "[failed] {} {} ({})", target, self.label, reason)
            }
        }
    }
}

/// Everything one action did
///
/// `outcomes` holds exactly one entry per requested item. The parent record
/// of a batch (meeting minutes, project) is reported separately in `header`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    pub header: Option<ExecutionOutcome>,
    pub outcomes: Vec<ExecutionOutcome>,
}

impl Execution {
    fn items(outcomes: Vec<ExecutionOutcome>) -> Self {
        Self {
            header: None,
            outcomes,
        }
    }
}

/// Applies resolved actions on behalf of one user
pub struct ActionExecutor<'a> {
    store: &'a dyn DomainStore,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(store: &'a dyn DomainStore) -> Self {
        Self { store }
    }

    pub fn execute(&self, action: &ResolvedAction, actor: &User) -> Execution {
        match action {
            ResolvedAction::CreateTask(task) => Execution::items(vec![self.create_task(task, actor)]),
            ResolvedAction::CreateEvent(event) => {
                Execution::items(vec![self.create_event(event, actor)])
            }
            ResolvedAction::UpdateEvents { targets, patch } => Execution::items(
                targets
                    .iter()
                    .map(|id| self.update_event(*id, patch, actor))
                    .collect(),
            ),
            ResolvedAction::DeleteEvents { targets } => Execution::items(
                targets
                    .iter()
                    .map(|id| self.delete_event(*id, actor))
                    .collect(),
            ),
            ResolvedAction::RecordMeeting(meeting) => self.record_meeting(meeting, actor),
            ResolvedAction::CreatePlan(plan) => self.create_plan(plan, actor),
            ResolvedAction::SaveTemplate(template) => {
                Execution::items(vec![self.save_template(template, actor)])
            }
        }
    }

    fn create_task(&self, task: &ResolvedTask, actor: &User) -> ExecutionOutcome {
        if task.title.is_empty() {
            return ExecutionOutcome::new(
                None,
                "task",
                OutcomeStatus::SkippedInvalid("missing title".into()),
            );
        }

        let new_task = NewTask {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            department: task.department,
            start_date: task.start_date,
            due_date: task.due_date,
            project_id: task.project_id,
            assignee_ids: task.assignee_ids.clone(),
            creator_id: actor.id,
            origin: TaskOrigin::Command,
        };

        match self.store.create_task(new_task) {
            Ok(id) => ExecutionOutcome::applied(EntityRef::Task(id), &task.title),
            Err(e) => {
                tracing::error!("Failed to create task '{}': {}", task.title, e);
                ExecutionOutcome::new(None, &task.title, OutcomeStatus::Failed(e.to_string()))
            }
        }
    }

    fn create_event(&self, event: &ResolvedEvent, actor: &User) -> ExecutionOutcome {
        let label = event.title.clone().unwrap_or_else(|| "event".into());
        let (Some(title), Some(start)) = (&event.title, event.start) else {
            let missing = if event.title.is_none() { "title" } else { "start" };
            tracing::debug!("Skipping event create: missing {}", missing);
            return ExecutionOutcome::new(
                None,
                label,
                OutcomeStatus::SkippedInvalid(format!("missing {}", missing)),
            );
        };
        if event.end.is_some_and(|end| end < start) {
            return ExecutionOutcome::new(
                None,
                label,
                OutcomeStatus::SkippedInvalid("end before start".into()),
            );
        }

        let new_event = NewEvent {
            title: title.clone(),
            description: event.description.clone(),
            start,
            end: event.end,
            all_day: event.all_day,
            location: event.location.clone(),
            creator_id: actor.id,
            assignee_id: event.assignee_id,
        };

        match self.store.create_event(new_event) {
            Ok(id) => ExecutionOutcome::applied(EntityRef::Event(id), label),
            Err(e) => ExecutionOutcome::new(None, label, OutcomeStatus::Failed(e.to_string())),
        }
    }

    fn update_event(&self, id: EventId, patch: &EventPatch, actor: &User) -> ExecutionOutcome {
        let target = Some(EntityRef::Event(id));
        let existing = match self.authorized_event(id, actor) {
            Ok(event) => event,
            Err(outcome) => return outcome,
        };
        if patch.is_empty() {
            return ExecutionOutcome::new(
                target,
                existing.title,
                OutcomeStatus::SkippedInvalid("nothing to change".into()),
            );
        }

        // Judge the event as it would look after the patch
        let mut merged = existing.clone();
        patch.apply_to(&mut merged);
        if merged.end.is_some_and(|end| end < merged.start) {
            return ExecutionOutcome::new(
                target,
                existing.title,
                OutcomeStatus::SkippedInvalid("end before start".into()),
            );
        }

        match self.store.update_event(id, patch) {
            Ok(()) => ExecutionOutcome::new(target, existing.title, OutcomeStatus::Applied),
            Err(e) => ExecutionOutcome::new(
                target,
                existing.title,
                OutcomeStatus::Failed(e.to_string()),
            ),
        }
    }

    fn delete_event(&self, id: EventId, actor: &User) -> ExecutionOutcome {
        let target = Some(EntityRef::Event(id));
        let existing = match self.authorized_event(id, actor) {
            Ok(event) => event,
            Err(outcome) => return outcome,
        };

        match self.store.delete_event(id) {
            Ok(()) => ExecutionOutcome::new(target, existing.title, OutcomeStatus::Applied),
            Err(e) => ExecutionOutcome::new(
                target,
                existing.title,
                OutcomeStatus::Failed(e.to_string()),
            ),
        }
    }

    /// Re-fetch the event and check ownership
    fn authorized_event(&self, id: EventId, actor: &User) -> Result<Event, ExecutionOutcome> {
        let target = Some(EntityRef::Event(id));
        let event = match self.store.event(id) {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::debug!("Event {} does not exist", id);
                return Err(ExecutionOutcome::new(
                    target,
                    "event",
                    OutcomeStatus::SkippedInvalid("event not found".into()),
                ));
            }
            Err(e) => {
                return Err(ExecutionOutcome::new(
                    target,
                    "event",
                    OutcomeStatus::Failed(e.to_string()),
                ))
            }
        };

        if event.creator_id != actor.id && !actor.is_admin() {
            tracing::warn!(
                "User {} may not modify event {} owned by {}",
                actor.id,
                id,
                event.creator_id
            );
            return Err(ExecutionOutcome::new(
                target,
                event.title,
                OutcomeStatus::SkippedUnauthorized,
            ));
        }
        Ok(event)
    }

    /// Minutes are saved first; a failed task commit leaves them in place
    fn record_meeting(&self, meeting: &ResolvedMeeting, actor: &User) -> Execution {
        let saved = self.store.create_meeting(NewMeeting {
            date: meeting.date,
            time: meeting.time.clone(),
            location: meeting.location.clone(),
            topic: meeting.topic.clone(),
            attendees: meeting.attendees.clone(),
            content: meeting.content.clone(),
            summary: meeting.summary.clone(),
            writer_id: actor.id,
        });

        let (header, origin) = match saved {
            Ok(id) => (
                ExecutionOutcome::applied(EntityRef::Meeting(id), &meeting.topic),
                Ok(TaskOrigin::Meeting(id)),
            ),
            Err(e) => {
                tracing::error!("Failed to save meeting minutes: {}", e);
                (
                    ExecutionOutcome::new(
                        None,
                        &meeting.topic,
                        OutcomeStatus::Failed(e.to_string()),
                    ),
                    Err(e.to_string()),
                )
            }
        };

        Execution {
            header: Some(header),
            outcomes: self.commit_batch(&meeting.items, origin, None, None, actor),
        }
    }

    fn create_plan(&self, plan: &ResolvedPlan, actor: &User) -> Execution {
        let (header, project) = match plan.existing_project {
            Some(id) => self.existing_project(id),
            None if plan.project_name.is_empty() => (
                ExecutionOutcome::new(
                    None,
                    "project",
                    OutcomeStatus::SkippedInvalid("missing project name".into()),
                ),
                Err("missing project name".to_string()),
            ),
            None => {
                let created = self.store.create_project(NewProject {
                    name: plan.project_name.clone(),
                    description: plan.description.clone(),
                    start_date: Some(plan.start_date),
                    end_date: Some(plan.end_date),
                    department: plan.department,
                });
                match created {
                    Ok(id) => (
                        ExecutionOutcome::applied(EntityRef::Project(id), &plan.project_name),
                        Ok(id),
                    ),
                    Err(e) => {
                        tracing::error!("Failed to create project '{}': {}", plan.project_name, e);
                        (
                            ExecutionOutcome::new(
                                None,
                                &plan.project_name,
                                OutcomeStatus::Failed(e.to_string()),
                            ),
                            Err(e.to_string()),
                        )
                    }
                }
            }
        };

        let project_id = project.as_ref().ok().copied();
        let outcomes = self.commit_batch(
            &plan.items,
            project.map(TaskOrigin::Plan),
            project_id,
            plan.department,
            actor,
        );
        Execution {
            header: Some(header),
            outcomes,
        }
    }

    /// The project was open at grounding time; make sure it still exists
    fn existing_project(&self, id: ProjectId) -> (ExecutionOutcome, Result<ProjectId, String>) {
        let target = Some(EntityRef::Project(id));
        match self.store.project(id) {
            Ok(Some(project)) => (
                ExecutionOutcome::new(target, project.name, OutcomeStatus::Applied),
                Ok(id),
            ),
            Ok(None) => (
                ExecutionOutcome::new(
                    target,
                    "project",
                    OutcomeStatus::SkippedInvalid("project not found".into()),
                ),
                Err("project not found".to_string()),
            ),
            Err(e) => (
                ExecutionOutcome::new(target, "project", OutcomeStatus::Failed(e.to_string())),
                Err(e.to_string()),
            ),
        }
    }

    /// Invalid items are skipped; the rest go out in one commit
    fn commit_batch(
        &self,
        items: &[BatchItem],
        origin: Result<TaskOrigin, String>,
        project_id: Option<ProjectId>,
        department: Option<Department>,
        actor: &User,
    ) -> Vec<ExecutionOutcome> {
        let mut outcomes: Vec<Option<ExecutionOutcome>> = vec![None; items.len()];
        let mut pending = Vec::new();

        for (index, item) in items.iter().enumerate() {
            let Some(title) = &item.title else {
                outcomes[index] = Some(ExecutionOutcome::new(
                    None,
                    "task",
                    OutcomeStatus::SkippedInvalid("missing title".into()),
                ));
                continue;
            };
            match &origin {
                Ok(origin) => pending.push((
                    index,
                    NewTask {
                        title: title.clone(),
                        description: item.description.clone(),
                        status: TaskStatus::Todo,
                        department,
                        start_date: item.start_date,
                        due_date: item.due_date,
                        project_id,
                        assignee_ids: item.assignee_ids.clone(),
                        creator_id: actor.id,
                        origin: *origin,
                    },
                )),
                Err(reason) => {
                    outcomes[index] = Some(ExecutionOutcome::new(
                        None,
                        title,
                        OutcomeStatus::Failed(format!("parent not saved: {}", reason)),
                    ));
                }
            }
        }

        if !pending.is_empty() {
            let (indices, tasks): (Vec<usize>, Vec<NewTask>) = pending.into_iter().unzip();
            let titles: Vec<String> = tasks.iter().map(|t| t.title.clone()).collect();
            match self.store.create_tasks(tasks) {
                Ok(ids) => {
                    for ((index, id), title) in indices.into_iter().zip(ids).zip(titles) {
                        outcomes[index] = Some(ExecutionOutcome::applied(EntityRef::Task(id), title));
                    }
                }
                Err(e) => {
                    tracing::error!("Batch task commit failed: {}", e);
                    for (index, title) in indices.into_iter().zip(titles) {
                        outcomes[index] = Some(ExecutionOutcome::new(
                            None,
                            title,
                            OutcomeStatus::Failed(e.to_string()),
                        ));
                    }
                }
            }
        }

        outcomes.into_iter().flatten().collect()
    }

    fn save_template(&self, template: &ResolvedTemplate, actor: &User) -> ExecutionOutcome {
        if template.name.is_empty() {
            return ExecutionOutcome::new(
                None,
                "template",
                OutcomeStatus::SkippedInvalid("missing name".into()),
            );
        }

        let phases = template
            .phases
            .iter()
            .map(|phase| TemplatePhase {
                phase_name: phase.phase_name.clone(),
                tasks: phase
                    .tasks
                    .iter()
                    .filter_map(|task| {
                        Some(TemplateTask {
                            title: task.title.clone()?,
                            description: task.description.clone(),
                            estimated_days: task.estimated_days,
                            is_core: task.is_core,
                            checklist: task.checklist.clone(),
                        })
                    })
                    .collect(),
            })
            .collect();

        let result = self.store.create_template(NewTemplate {
            name: template.name.clone(),
            category: template.category.clone(),
            description: template.description.clone(),
            phases,
            author_id: actor.id,
        });

        match result {
            Ok(id) => ExecutionOutcome::applied(EntityRef::Template(id), &template.name),
            Err(e) => ExecutionOutcome::new(
                None,
                &template.name,
                OutcomeStatus::Failed(e.to_string()),
            ),
        }
    }
}
