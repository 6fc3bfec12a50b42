//! Intent resolution - converts validated skeletons into concrete ids, dates and defaults
//!
//! Resolution is pure: it reads the skeleton and the grounding snapshot and
//! nothing else. Every field handed to the executor is a typed value or
//! `None`; no raw string survives this stage.
//!
//! Policies:
//! - names match exactly and case-sensitively, otherwise `None` (no guessing)
//! - numeric ids count only when they appear in the grounding snapshot
//! - `0`, negative ids and blank strings mean "nothing selected"
//! - dates are `YYYY-MM-DD`, timestamps ISO 8601 local; anything else is `None`

use crate::core::config::DefaultsConfig;
use crate::core::types::{Department, EventId, ProjectId, UserId};
use crate::domain::model::{EventPatch, TaskStatus};
use crate::llm::context::GroundingContext;
use crate::llm::schema::{
    ActionItemDraft, EventDraft, EventVerb, IntentSkeleton, MeetingDraft, PhaseDraft, PlanDraft,
    RawRef, TaskDraft, TemplateDraft,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Longest duration a single plan or template task may claim
pub const MAX_TASK_DAYS: i64 = 3650;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("no target event identified for {0:?}")]
    NoTargetIdentified(EventVerb),
}

/// A task ready to be created
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub department: Option<Department>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub project_id: Option<ProjectId>,
    pub assignee_ids: Vec<UserId>,
}

impl ResolvedTask {
    /// Primary assignee
    pub fn assignee_id(&self) -> Option<UserId> {
        self.assignee_ids.first().copied()
    }
}

/// A calendar entry to create; title and start are checked by the executor
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    pub location: Option<String>,
    pub assignee_id: Option<UserId>,
}

/// One task in a batch; items without a title are skipped at execution
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub assignee_ids: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMeeting {
    pub date: NaiveDate,
    pub time: Option<String>,
    pub location: Option<String>,
    pub topic: String,
    pub attendees: Vec<String>,
    pub summary: Option<String>,
    /// Raw notes; filled from the request text, not the model
    pub content: String,
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlan {
    /// Extend this project instead of creating a new one
    pub existing_project: Option<ProjectId>,
    pub project_name: String,
    pub description: Option<String>,
    pub department: Option<Department>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub items: Vec<BatchItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_days: i64,
    pub is_core: bool,
    pub checklist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPhase {
    pub phase_name: String,
    pub tasks: Vec<ResolvedTemplateTask>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTemplate {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub phases: Vec<ResolvedPhase>,
}

/// Intent after reference resolution
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedAction {
    CreateTask(ResolvedTask),
    CreateEvent(ResolvedEvent),
    UpdateEvents {
        targets: Vec<EventId>,
        patch: EventPatch,
    },
    DeleteEvents {
        targets: Vec<EventId>,
    },
    RecordMeeting(ResolvedMeeting),
    CreatePlan(ResolvedPlan),
    SaveTemplate(ResolvedTemplate),
}

impl ResolvedAction {
    /// Meeting minutes keep the notes exactly as the user submitted them
    pub fn attach_source_text(&mut self, text: &str) {
        if let ResolvedAction::RecordMeeting(meeting) = self {
            meeting.content = text.to_string();
        }
    }
}

/// Resolves skeleton references against a grounding snapshot
pub struct EntityResolver<'a> {
    defaults: &'a DefaultsConfig,
}

impl<'a> EntityResolver<'a> {
    pub fn new(defaults: &'a DefaultsConfig) -> Self {
        Self { defaults }
    }

    pub fn resolve(
        &self,
        skeleton: &IntentSkeleton,
        ctx: &GroundingContext,
    ) -> Result<ResolvedAction, ResolutionError> {
        match skeleton {
            IntentSkeleton::CreateTask(draft) => Ok(ResolvedAction::CreateTask(
                self.resolve_task(draft, ctx),
            )),
            IntentSkeleton::EventAction(draft) => self.resolve_event(draft, ctx),
            IntentSkeleton::AnalyzeMeeting(draft) => Ok(ResolvedAction::RecordMeeting(
                self.resolve_meeting(draft, ctx),
            )),
            IntentSkeleton::GenerateProjectPlan(draft) => {
                Ok(ResolvedAction::CreatePlan(self.resolve_plan(draft, ctx)))
            }
            IntentSkeleton::GenerateTemplate(draft) => {
                Ok(ResolvedAction::SaveTemplate(self.resolve_template(draft)))
            }
        }
    }

    fn resolve_task(&self, draft: &TaskDraft, ctx: &GroundingContext) -> ResolvedTask {
        ResolvedTask {
            // Schema guarantees presence, not content
            title: normalize_text(Some(draft.title.as_str())).unwrap_or_default(),
            description: normalize_text(draft.description.as_deref()),
            status: normalize_text(draft.status.as_deref())
                .and_then(|s| TaskStatus::parse(&s))
                .unwrap_or_default(),
            department: resolve_department(draft.department.as_deref()),
            start_date: draft.start_date.as_deref().and_then(parse_date),
            // A new task with no stated deadline is due today
            due_date: Some(
                draft
                    .due_date
                    .as_deref()
                    .and_then(parse_date)
                    .unwrap_or_else(|| ctx.today()),
            ),
            project_id: resolve_project(draft.project.as_ref(), ctx),
            assignee_ids: resolve_users(&draft.assignees, ctx),
        }
    }

    fn resolve_event(
        &self,
        draft: &EventDraft,
        ctx: &GroundingContext,
    ) -> Result<ResolvedAction, ResolutionError> {
        let title = normalize_text(draft.title.as_deref());
        let description = normalize_text(draft.description.as_deref());
        let start = draft.start.as_deref().and_then(parse_timestamp);
        let end = draft.end.as_deref().and_then(parse_timestamp);
        let location = normalize_text(draft.location.as_deref());
        let assignee_id = resolve_user(draft.assignee.as_ref(), ctx);

        if draft.action == EventVerb::Create {
            return Ok(ResolvedAction::CreateEvent(ResolvedEvent {
                title,
                description,
                start,
                end,
                all_day: draft.all_day.unwrap_or(false),
                location,
                assignee_id,
            }));
        }

        let targets = resolve_targets(&draft.event_ids);
        if targets.is_empty() {
            return Err(ResolutionError::NoTargetIdentified(draft.action));
        }

        if draft.action == EventVerb::Delete {
            return Ok(ResolvedAction::DeleteEvents { targets });
        }

        Ok(ResolvedAction::UpdateEvents {
            targets,
            patch: EventPatch {
                title,
                description,
                start,
                end,
                all_day: draft.all_day,
                location,
                assignee_id,
            },
        })
    }

    fn resolve_meeting(&self, draft: &MeetingDraft, ctx: &GroundingContext) -> ResolvedMeeting {
        let date = draft
            .date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or_else(|| ctx.today());
        let default_due = add_days(date, self.defaults.meeting_task_due_days).unwrap_or(date);

        ResolvedMeeting {
            date,
            time: normalize_text(draft.time.as_deref()),
            location: normalize_text(draft.location.as_deref()),
            topic: normalize_text(Some(draft.topic.as_str())).unwrap_or_default(),
            attendees: draft
                .attendees
                .iter()
                .filter_map(|a| normalize_text(Some(a.as_str())))
                .collect(),
            summary: normalize_text(draft.summary.as_deref()),
            content: String::new(),
            items: draft
                .action_items
                .iter()
                .map(|item| resolve_action_item(item, default_due, ctx))
                .collect(),
        }
    }

    fn resolve_plan(&self, draft: &PlanDraft, ctx: &GroundingContext) -> ResolvedPlan {
        let start_date = draft
            .start_date
            .as_deref()
            .and_then(parse_date)
            .unwrap_or_else(|| ctx.today());

        // Tasks run back to back in the order given
        let mut cursor = start_date;
        let mut end_date = start_date;
        let mut items = Vec::new();
        for phase in &draft.phases {
            let phase_name = normalize_text(phase.phase_name.as_deref());
            for task in &phase.tasks {
                let title = normalize_text(task.title.as_deref());
                // Past the calendar's end the task stays unscheduled
                let slot = title.as_ref().and_then(|_| {
                    let days = task_days(task.estimated_days, self.defaults.plan_task_days);
                    let due = add_days(cursor, days - 1)?;
                    let next = add_days(due, 1)?;
                    Some((cursor, due, next))
                });
                let (start, due) = match slot {
                    Some((start, due, next)) => {
                        cursor = next;
                        end_date = due;
                        (Some(start), Some(due))
                    }
                    None => (None, None),
                };

                items.push(BatchItem {
                    title,
                    description: fold_description(
                        phase_name.as_deref(),
                        task.description.as_deref(),
                        &task.checklist,
                    ),
                    start_date: start,
                    due_date: due,
                    assignee_ids: resolve_user(task.assignee.as_ref(), ctx)
                        .into_iter()
                        .collect(),
                });
            }
        }

        ResolvedPlan {
            existing_project: resolve_project(draft.project.as_ref(), ctx),
            project_name: normalize_text(Some(draft.project_name.as_str())).unwrap_or_default(),
            description: normalize_text(draft.description.as_deref()),
            department: resolve_department(draft.department.as_deref()),
            start_date,
            end_date,
            items,
        }
    }

    fn resolve_template(&self, draft: &TemplateDraft) -> ResolvedTemplate {
        ResolvedTemplate {
            name: normalize_text(Some(draft.name.as_str())).unwrap_or_default(),
            category: normalize_text(draft.category.as_deref()),
            description: normalize_text(draft.description.as_deref()),
            phases: draft
                .phases
                .iter()
                .enumerate()
                .map(|(i, phase)| self.resolve_phase(i, phase))
                .collect(),
        }
    }

    fn resolve_phase(&self, index: usize, phase: &PhaseDraft) -> ResolvedPhase {
        ResolvedPhase {
            phase_name: normalize_text(phase.phase_name.as_deref())
                .unwrap_or_else(|| format!("Phase {}", index + 1)),
            tasks: phase
                .tasks
                .iter()
                .map(|task| ResolvedTemplateTask {
                    title: normalize_text(task.title.as_deref()),
                    description: normalize_text(task.description.as_deref()),
                    estimated_days: task_days(task.estimated_days, self.defaults.plan_task_days),
                    is_core: task.is_core.unwrap_or(false),
                    checklist: task
                        .checklist
                        .iter()
                        .filter_map(|c| normalize_text(Some(c.as_str())))
                        .collect(),
                })
                .collect(),
        }
    }
}

fn resolve_action_item(
    item: &ActionItemDraft,
    default_due: NaiveDate,
    ctx: &GroundingContext,
) -> BatchItem {
    BatchItem {
        title: normalize_text(item.title.as_deref()),
        description: normalize_text(item.description.as_deref()),
        start_date: None,
        due_date: Some(
            item.due_date
                .as_deref()
                .and_then(parse_date)
                .unwrap_or(default_due),
        ),
        assignee_ids: resolve_user(item.assignee.as_ref(), ctx)
            .into_iter()
            .collect(),
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Blank strings mean "nothing"
/// Positive estimate capped at `MAX_TASK_DAYS`, else the default
fn task_days(estimate: Option<i64>, default: i64) -> i64 {
    estimate
        .filter(|d| *d > 0)
        .unwrap_or(default)
        .clamp(1, MAX_TASK_DAYS)
}

/// Calendar arithmetic that yields `None` instead of overflowing
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    Duration::try_days(days).and_then(|d| date.checked_add_signed(d))
}

pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `0` and negative ids mean "nothing selected"
pub fn normalize_id(value: i64) -> Option<i64> {
    (value > 0).then_some(value)
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// ISO 8601 local time, `T` or space separated; a bare date means midnight
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| parse_date(value).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

fn resolve_department(value: Option<&str>) -> Option<Department> {
    normalize_text(value).and_then(|s| Department::parse(&s))
}

fn resolve_user(reference: Option<&RawRef>, ctx: &GroundingContext) -> Option<UserId> {
    match reference? {
        RawRef::Name(name) => ctx.user_by_name(normalize_text(Some(name.as_str()))?.as_str()),
        RawRef::Id(id) => normalize_id(*id)
            .map(UserId)
            .filter(|id| ctx.has_user(*id)),
    }
}

fn resolve_users(references: &[RawRef], ctx: &GroundingContext) -> Vec<UserId> {
    let mut ids = Vec::new();
    for id in references.iter().filter_map(|r| resolve_user(Some(r), ctx)) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn resolve_project(reference: Option<&RawRef>, ctx: &GroundingContext) -> Option<ProjectId> {
    match reference? {
        RawRef::Name(name) => ctx.project_by_name(normalize_text(Some(name.as_str()))?.as_str()),
        RawRef::Id(id) => normalize_id(*id)
            .map(ProjectId)
            .filter(|id| ctx.has_project(*id)),
    }
}

/// Ids the model claims to target; existence is checked at execution
fn resolve_targets(ids: &[i64]) -> Vec<EventId> {
    let mut targets = Vec::new();
    for id in ids.iter().filter_map(|id| normalize_id(*id)).map(EventId) {
        if !targets.contains(&id) {
            targets.push(id);
        }
    }
    targets
}

fn fold_description(
    phase_name: Option<&str>,
    description: Option<&str>,
    checklist: &[String],
) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(phase) = phase_name {
        parts.push(format!("[{}]", phase));
    }
    if let Some(desc) = normalize_text(description) {
        parts.push(desc);
    }
    let items: Vec<String> = checklist
        .iter()
        .filter_map(|c| normalize_text(Some(c.as_str())))
        .map(|c| format!("- [ ] {}", c))
        .collect();
    if !items.is_empty() {
        parts.push(format!("Checklist:\n{}", items.join("\n")));
    }
    (!parts.is_empty()).then(|| parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::context::{EventSummary, NamedProject, NamedUser};
    use crate::llm::schema::{IntentKind, SchemaRegistry};
    use proptest::prelude::*;
    use serde_json::json;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn named(id: i64, name: &str) -> NamedUser {
        NamedUser {
            id: UserId(id),
            name: name.into(),
            department: None,
        }
    }

    fn ctx() -> GroundingContext {
        let mut ctx = GroundingContext::empty(now(), named(1, "윤경식"));
        ctx.users = vec![named(1, "윤경식"), named(7, "김철수"), named(9, "Marcus")];
        ctx.projects = vec![NamedProject {
            id: ProjectId(20),
            name: "ERP 구축".into(),
        }];
        ctx.events = vec![EventSummary {
            id: EventId(40),
            title: "김 과장 미팅".into(),
            start: now() + Duration::days(1),
        }];
        ctx
    }

    fn resolve(kind: IntentKind, value: serde_json::Value) -> Result<ResolvedAction, ResolutionError> {
        let skeleton = SchemaRegistry::validate(kind, &value).unwrap();
        let defaults = DefaultsConfig::default();
        EntityResolver::new(&defaults).resolve(&skeleton, &ctx())
    }

    #[test]
    fn test_task_with_assignee_and_tomorrow() {
        let action = resolve(
            IntentKind::CreateTask,
            json!({ "title": "디자인 검토", "assignees": ["김철수"], "due_date": "2026-03-11" }),
        )
        .unwrap();
        let ResolvedAction::CreateTask(task) = action else {
            panic!("expected task");
        };
        assert_eq!(task.assignee_id(), Some(UserId(7)));
        assert_eq!(task.due_date, Some(date(3, 11)));
        assert_eq!(task.status, TaskStatus::Todo);
    }

    #[test]
    fn test_unmatched_names_resolve_to_none() {
        let action = resolve(
            IntentKind::CreateTask,
            json!({
                "title": "x",
                "assignees": ["marcus", "Marc", "박영희"],
                "project": "ERP",
                "due_date": null
            }),
        )
        .unwrap();
        let ResolvedAction::CreateTask(task) = action else {
            panic!("expected task");
        };
        assert!(task.assignee_ids.is_empty());
        assert_eq!(task.project_id, None);
    }

    #[test]
    fn test_sentinels_and_unknown_ids() {
        let action = resolve(
            IntentKind::CreateTask,
            json!({
                "title": "x",
                "assignees": [0, -3, 99, 9, 9],
                "project": 0,
                "department": "",
                "due_date": ""
            }),
        )
        .unwrap();
        let ResolvedAction::CreateTask(task) = action else {
            panic!("expected task");
        };
        assert_eq!(task.assignee_ids, vec![UserId(9)]);
        assert_eq!(task.project_id, None);
        assert_eq!(task.department, None);
        // blank due date falls back to today
        assert_eq!(task.due_date, Some(date(3, 10)));
    }

    #[test]
    fn test_project_by_name_and_id() {
        for project in [json!("ERP 구축"), json!(20)] {
            let action = resolve(
                IntentKind::CreateTask,
                json!({ "title": "x", "project": project, "due_date": null }),
            )
            .unwrap();
            let ResolvedAction::CreateTask(task) = action else {
                panic!("expected task");
            };
            assert_eq!(task.project_id, Some(ProjectId(20)));
        }
    }

    #[test]
    fn test_unparseable_dates() {
        let action = resolve(
            IntentKind::CreateTask,
            json!({ "title": "x", "start_date": "next week", "due_date": "03/11/2026" }),
        )
        .unwrap();
        let ResolvedAction::CreateTask(task) = action else {
            panic!("expected task");
        };
        assert_eq!(task.start_date, None);
        assert_eq!(task.due_date, Some(date(3, 10)));
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = date(3, 11).and_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-03-11T14:30"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-11T14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-11 14:30"), Some(expected));
        assert_eq!(
            parse_timestamp("2026-03-11"),
            date(3, 11).and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("tomorrow 2pm"), None);
    }

    #[test]
    fn test_update_and_delete_need_targets() {
        let result = resolve(
            IntentKind::EventAction,
            json!({ "action": "delete", "event_ids": [] }),
        );
        assert_eq!(
            result,
            Err(ResolutionError::NoTargetIdentified(EventVerb::Delete))
        );

        let result = resolve(
            IntentKind::EventAction,
            json!({ "action": "update", "event_ids": [0], "title": "x" }),
        );
        assert_eq!(
            result,
            Err(ResolutionError::NoTargetIdentified(EventVerb::Update))
        );
    }

    #[test]
    fn test_update_patch_only_has_present_fields() {
        let action = resolve(
            IntentKind::EventAction,
            json!({
                "action": "update",
                "event_ids": [40, 40, 77],
                "start": "2026-03-12T15:00",
                "assignee": "nobody"
            }),
        )
        .unwrap();
        let ResolvedAction::UpdateEvents { targets, patch } = action else {
            panic!("expected update");
        };
        // hallucinated id 77 is kept for the executor to reject
        assert_eq!(targets, vec![EventId(40), EventId(77)]);
        assert_eq!(patch.start, date(3, 12).and_hms_opt(15, 0, 0));
        assert_eq!(patch.title, None);
        assert_eq!(patch.assignee_id, None);
        assert_eq!(patch.all_day, None);
    }

    #[test]
    fn test_create_event_ignores_ids() {
        let action = resolve(
            IntentKind::EventAction,
            json!({ "action": "create", "event_ids": [], "title": "킥오프", "start": "2026-03-12T10:00", "assignee": 7 }),
        )
        .unwrap();
        let ResolvedAction::CreateEvent(event) = action else {
            panic!("expected create");
        };
        assert_eq!(event.title.as_deref(), Some("킥오프"));
        assert_eq!(event.assignee_id, Some(UserId(7)));
        assert!(!event.all_day);
    }

    #[test]
    fn test_meeting_items_default_due_a_week_after_meeting() {
        let action = resolve(
            IntentKind::AnalyzeMeeting,
            json!({
                "topic": "주간 회의",
                "date": "2026-03-02",
                "action_items": [
                    { "title": "견적서 발송", "assignee": "김철수" },
                    { "title": "샘플 확인", "due_date": "2026-03-05" },
                    { "title": "  ", "assignee": "Marcus" }
                ]
            }),
        )
        .unwrap();
        let ResolvedAction::RecordMeeting(meeting) = action else {
            panic!("expected meeting");
        };
        assert_eq!(meeting.date, date(3, 2));
        assert_eq!(meeting.items[0].due_date, Some(date(3, 9)));
        assert_eq!(meeting.items[0].assignee_ids, vec![UserId(7)]);
        assert_eq!(meeting.items[1].due_date, Some(date(3, 5)));
        assert_eq!(meeting.items[2].title, None);
    }

    #[test]
    fn test_plan_schedules_sequentially() {
        let action = resolve(
            IntentKind::GenerateProjectPlan,
            json!({
                "project_name": "유모차 신제품",
                "start_date": "2026-04-01",
                "phases": [
                    { "phase_name": "기획", "tasks": [
                        { "title": "VOC 분석", "estimated_days": 5, "checklist": ["경쟁사 비교표"] },
                        { "description": "untitled" },
                        { "title": "컨셉 정의", "estimated_days": 0 }
                    ]},
                    { "tasks": [ { "title": "PRD 작성", "estimated_days": 3 } ] }
                ]
            }),
        )
        .unwrap();
        let ResolvedAction::CreatePlan(plan) = action else {
            panic!("expected plan");
        };
        assert_eq!(plan.items.len(), 4);
        assert_eq!(plan.items[0].start_date, Some(date(4, 1)));
        assert_eq!(plan.items[0].due_date, Some(date(4, 5)));
        assert_eq!(plan.items[1].due_date, None);
        // zero estimate falls back to one day
        assert_eq!(plan.items[2].start_date, Some(date(4, 6)));
        assert_eq!(plan.items[2].due_date, Some(date(4, 6)));
        assert_eq!(plan.items[3].due_date, Some(date(4, 9)));
        assert_eq!(plan.end_date, date(4, 9));
        assert_eq!(
            plan.items[0].description.as_deref(),
            Some("[기획]\nChecklist:\n- [ ] 경쟁사 비교표")
        );
    }

    #[test]
    fn test_plan_caps_oversized_estimates() {
        let action = resolve(
            IntentKind::GenerateProjectPlan,
            json!({
                "project_name": "장기 과제",
                "start_date": "2026-04-01",
                "phases": [ { "tasks": [
                    { "title": "a", "estimated_days": 100000000i64 },
                    { "title": "b", "estimated_days": i64::MAX }
                ]}]
            }),
        )
        .unwrap();
        let ResolvedAction::CreatePlan(plan) = action else {
            panic!("expected plan");
        };
        let first_due = add_days(date(4, 1), MAX_TASK_DAYS - 1).unwrap();
        assert_eq!(plan.items[0].due_date, Some(first_due));
        assert_eq!(plan.items[1].start_date, add_days(first_due, 1));
        assert_eq!(plan.end_date, plan.items[1].due_date.unwrap());
    }

    #[test]
    fn test_plan_at_calendar_end_leaves_tasks_unscheduled() {
        let value = json!({
            "project_name": "끝",
            "phases": [ { "tasks": [ { "title": "a", "estimated_days": 5 } ] } ]
        });
        let skeleton = SchemaRegistry::validate(IntentKind::GenerateProjectPlan, &value).unwrap();
        let defaults = DefaultsConfig::default();
        let last = NaiveDate::MAX.and_hms_opt(0, 0, 0).unwrap();
        let context = GroundingContext::empty(last, named(1, "윤경식"));

        let action = EntityResolver::new(&defaults).resolve(&skeleton, &context).unwrap();
        let ResolvedAction::CreatePlan(plan) = action else {
            panic!("expected plan");
        };
        assert_eq!(plan.items[0].start_date, None);
        assert_eq!(plan.items[0].due_date, None);
        assert_eq!(plan.end_date, NaiveDate::MAX);
    }

    #[test]
    fn test_meeting_due_offset_overflow_uses_meeting_date() {
        let value = json!({ "topic": "t", "date": "2026-03-10", "action_items": [ { "title": "a" } ] });
        let skeleton = SchemaRegistry::validate(IntentKind::AnalyzeMeeting, &value).unwrap();
        let defaults = DefaultsConfig {
            meeting_task_due_days: i64::MAX,
            ..DefaultsConfig::default()
        };

        let action = EntityResolver::new(&defaults).resolve(&skeleton, &ctx()).unwrap();
        let ResolvedAction::RecordMeeting(meeting) = action else {
            panic!("expected meeting");
        };
        assert_eq!(meeting.items[0].due_date, Some(date(3, 10)));
    }

    #[test]
    fn test_template_estimates_are_capped() {
        let action = resolve(
            IntentKind::GenerateTemplate,
            json!({
                "name": "t",
                "phases": [ { "tasks": [ { "title": "a", "estimated_days": i64::MAX } ] } ]
            }),
        )
        .unwrap();
        let ResolvedAction::SaveTemplate(template) = action else {
            panic!("expected template");
        };
        assert_eq!(template.phases[0].tasks[0].estimated_days, MAX_TASK_DAYS);
    }

    #[test]
    fn test_template_phase_names_default() {
        let action = resolve(
            IntentKind::GenerateTemplate,
            json!({
                "name": "KC 인증 대응",
                "phases": [ { "tasks": [ { "title": "시료 준비", "is_core": true } ] } ]
            }),
        )
        .unwrap();
        let ResolvedAction::SaveTemplate(template) = action else {
            panic!("expected template");
        };
        assert_eq!(template.phases[0].phase_name, "Phase 1");
        assert!(template.phases[0].tasks[0].is_core);
        assert_eq!(template.phases[0].tasks[0].estimated_days, 1);
    }

    #[test]
    fn test_attach_source_text_only_touches_meetings() {
        let mut action = resolve(
            IntentKind::AnalyzeMeeting,
            json!({ "topic": "t", "action_items": [] }),
        )
        .unwrap();
        action.attach_source_text("raw notes");
        let ResolvedAction::RecordMeeting(meeting) = &action else {
            panic!("expected meeting");
        };
        assert_eq!(meeting.content, "raw notes");
    }

    fn reference_strategy() -> impl Strategy<Value = serde_json::Value> {
        prop_oneof![
            any::<i64>().prop_map(|n| json!(n)),
            (-2i64..12).prop_map(|n| json!(n)),
            prop::sample::select(vec!["김철수", "Marcus", "marcus", "", " ", "윤경식"])
                .prop_map(|s| json!(s)),
            "[a-zA-Z가-힣 ]{0,8}".prop_map(|s| json!(s)),
        ]
    }

    proptest! {
        #[test]
        fn prop_plan_dates_stay_ordered(estimates in prop::collection::vec(any::<i64>(), 1..6)) {
            let tasks: Vec<_> = estimates
                .iter()
                .enumerate()
                .map(|(i, d)| json!({ "title": format!("t{}", i), "estimated_days": d }))
                .collect();
            let value = json!({
                "project_name": "p",
                "start_date": "2026-04-01",
                "phases": [ { "tasks": tasks } ]
            });
            let skeleton = SchemaRegistry::validate(IntentKind::GenerateProjectPlan, &value).unwrap();
            let defaults = DefaultsConfig::default();
            let action = EntityResolver::new(&defaults).resolve(&skeleton, &ctx()).unwrap();
            let ResolvedAction::CreatePlan(plan) = action else {
                panic!("expected plan");
            };
            for item in &plan.items {
                if let (Some(start), Some(due)) = (item.start_date, item.due_date) {
                    prop_assert!(start <= due);
                    prop_assert!(start >= plan.start_date && due <= plan.end_date);
                }
            }
        }

        #[test]
        fn prop_resolution_is_deterministic(
            assignees in prop::collection::vec(reference_strategy(), 0..5),
            project in reference_strategy(),
            due in "[0-9\\-/]{0,12}",
        ) {
            let value = json!({
                "title": "x",
                "assignees": assignees,
                "project": project,
                "due_date": due
            });
            let skeleton = SchemaRegistry::validate(IntentKind::CreateTask, &value).unwrap();
            let defaults = DefaultsConfig::default();
            let resolver = EntityResolver::new(&defaults);
            let context = ctx();

            let first = resolver.resolve(&skeleton, &context);
            let second = resolver.resolve(&skeleton, &context);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_resolved_ids_come_from_grounding(
            assignees in prop::collection::vec(reference_strategy(), 0..6),
        ) {
            let value = json!({ "title": "x", "assignees": assignees, "due_date": null });
            let skeleton = SchemaRegistry::validate(IntentKind::CreateTask, &value).unwrap();
            let defaults = DefaultsConfig::default();
            let context = ctx();
            let Ok(ResolvedAction::CreateTask(task)) =
                EntityResolver::new(&defaults).resolve(&skeleton, &context)
            else {
                panic!("expected task");
            };
            for id in task.assignee_ids {
                prop_assert!(context.has_user(id));
            }
        }

        #[test]
        fn prop_non_positive_ids_are_none(id in i64::MIN..=0) {
            prop_assert_eq!(normalize_id(id), None);
        }
    }
}
