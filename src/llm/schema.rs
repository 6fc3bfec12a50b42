//! Output contracts for every supported intent
//!
//! Each intent kind has one `IntentSchema`: the instruction embedded in the
//! prompt, the field list the model must return, and a validator that turns
//! any JSON value into either a typed skeleton or the full list of offending
//! fields. Model output reaches the rest of the engine only through
//! `IntentSchema::validate`.
//!
//! Validation rules:
//! - the top-level value must be an object
//! - every declared field is type-checked; all problems are reported together
//! - unknown fields are ignored
//! - `Required` fields must be present and non-null, `Nullable` fields must be
//!   present, `Optional` fields may be absent or null

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The kind of request the caller is making
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Create a single task from a free-form request
    CreateTask,
    /// Create, move or cancel calendar events
    EventAction,
    /// Turn raw meeting notes into minutes and action items
    AnalyzeMeeting,
    /// Turn a project brief into a project with scheduled tasks
    GenerateProjectPlan,
    /// Draft a reusable work-breakdown template
    GenerateTemplate,
}

impl IntentKind {
    pub const ALL: [IntentKind; 5] = [
        IntentKind::CreateTask,
        IntentKind::EventAction,
        IntentKind::AnalyzeMeeting,
        IntentKind::GenerateProjectPlan,
        IntentKind::GenerateTemplate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::CreateTask => "create_task",
            IntentKind::EventAction => "event_action",
            IntentKind::AnalyzeMeeting => "analyze_meeting",
            IntentKind::GenerateProjectPlan => "generate_project_plan",
            IntentKind::GenerateTemplate => "generate_template",
        }
    }

    /// Whether open projects belong in the grounding context
    pub fn needs_projects(&self) -> bool {
        matches!(
            self,
            IntentKind::CreateTask | IntentKind::AnalyzeMeeting | IntentKind::GenerateProjectPlan
        )
    }

    /// Whether the calendar window belongs in the grounding context
    pub fn needs_events(&self) -> bool {
        matches!(self, IntentKind::EventAction)
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "create_task" | "task" => Ok(IntentKind::CreateTask),
            "event_action" | "event" | "calendar" => Ok(IntentKind::EventAction),
            "analyze_meeting" | "meeting" => Ok(IntentKind::AnalyzeMeeting),
            "generate_project_plan" | "plan" => Ok(IntentKind::GenerateProjectPlan),
            "generate_template" | "template" => Ok(IntentKind::GenerateTemplate),
            other => Err(format!("unknown intent kind: {}", other)),
        }
    }
}

// ============================================================================
// Field specifications
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Nullable,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
    Text,
    /// `YYYY-MM-DD` string; the format itself is checked during resolution
    Date,
    /// ISO 8601 local timestamp string
    Timestamp,
    Integer,
    Boolean,
    /// Name string or numeric id
    Reference,
    ReferenceList,
    IdList,
    TextList,
    OneOf(&'static [&'static str]),
    Records(&'static [FieldSpec]),
}

impl FieldType {
    fn describe(&self) -> String {
        match self {
            FieldType::Text => "string".into(),
            FieldType::Date => "string \"YYYY-MM-DD\"".into(),
            FieldType::Timestamp => "string \"YYYY-MM-DDTHH:MM\"".into(),
            FieldType::Integer => "integer".into(),
            FieldType::Boolean => "boolean".into(),
            FieldType::Reference => "name string or id integer".into(),
            FieldType::ReferenceList => "array of name strings or id integers".into(),
            FieldType::IdList => "array of integers".into(),
            FieldType::TextList => "array of strings".into(),
            FieldType::OneOf(options) => format!("one of {}", options.join("|")),
            FieldType::Records(_) => "array of objects".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub presence: Presence,
    pub hint: &'static str,
}

const fn field(
    name: &'static str,
    ty: FieldType,
    presence: Presence,
    hint: &'static str,
) -> FieldSpec {
    FieldSpec {
        name,
        ty,
        presence,
        hint,
    }
}

use FieldType::*;
use Presence::*;

const TASK_FIELDS: &[FieldSpec] = &[
    field("title", Text, Required, "short task title"),
    field("description", Text, Optional, "details, or null"),
    field("assignees", ReferenceList, Optional, "users to assign, by exact name or id"),
    field("project", Reference, Optional, "open project by exact name or id, 0 or null for none"),
    field("department", Text, Optional, "System, Distribution or Management"),
    field("status", Text, Optional, "Todo, In Progress or Done"),
    field("start_date", Date, Optional, "null if not stated"),
    field("due_date", Date, Nullable, "deadline, null if not stated"),
];

const EVENT_FIELDS: &[FieldSpec] = &[
    field("action", OneOf(&["create", "update", "delete"]), Required, "what to do"),
    field("event_ids", IdList, Required, "ids of existing events to update/delete, [] for create or when nothing matches"),
    field("title", Text, Optional, "event title"),
    field("description", Text, Optional, "details"),
    field("start", Timestamp, Optional, "start time"),
    field("end", Timestamp, Optional, "end time"),
    field("all_day", Boolean, Optional, "true for all-day events"),
    field("location", Text, Optional, "place"),
    field("assignee", Reference, Optional, "responsible user by exact name or id"),
];

const ACTION_ITEM_FIELDS: &[FieldSpec] = &[
    field("title", Text, Optional, "what must be done"),
    field("description", Text, Optional, "details"),
    field("assignee", Reference, Optional, "owner by exact name or id"),
    field("due_date", Date, Optional, "deadline if stated"),
];

const MEETING_FIELDS: &[FieldSpec] = &[
    field("topic", Text, Required, "meeting subject"),
    field("date", Date, Optional, "meeting date"),
    field("time", Text, Optional, "meeting time as written"),
    field("location", Text, Optional, "place"),
    field("attendees", TextList, Optional, "participant names"),
    field("summary", Text, Optional, "a few sentences summarizing decisions"),
    field("action_items", Records(ACTION_ITEM_FIELDS), Required, "follow-up tasks, [] if none"),
];

const PLAN_TASK_FIELDS: &[FieldSpec] = &[
    field("title", Text, Optional, "task title"),
    field("description", Text, Optional, "details"),
    field("estimated_days", Integer, Optional, "working days needed"),
    field("assignee", Reference, Optional, "owner by exact name or id"),
    field("is_core", Boolean, Optional, "true for mandatory steps"),
    field("checklist", TextList, Optional, "deliverables to check off"),
];

const PHASE_FIELDS: &[FieldSpec] = &[
    field("phase_name", Text, Optional, "stage name"),
    field("tasks", Records(PLAN_TASK_FIELDS), Required, "tasks in this stage"),
];

const PLAN_FIELDS: &[FieldSpec] = &[
    field("project_name", Text, Required, "name for the project"),
    field("project", Reference, Optional, "existing open project to extend, by exact name or id"),
    field("description", Text, Optional, "project summary"),
    field("department", Text, Optional, "System, Distribution or Management"),
    field("start_date", Date, Optional, "kickoff date"),
    field("phases", Records(PHASE_FIELDS), Required, "ordered stages"),
];

const TEMPLATE_FIELDS: &[FieldSpec] = &[
    field("name", Text, Required, "template name"),
    field("category", Text, Optional, "catalog category"),
    field("description", Text, Optional, "when to use this template"),
    field("phases", Records(PHASE_FIELDS), Required, "ordered stages"),
];

// ============================================================================
// Schemas
// ============================================================================

/// Contract for one intent kind
#[derive(Debug)]
pub struct IntentSchema {
    pub kind: IntentKind,
    pub instruction: &'static str,
    pub fields: &'static [FieldSpec],
}

static SCHEMAS: [IntentSchema; 5] = [
    IntentSchema {
        kind: IntentKind::CreateTask,
        instruction: "Extract one work task from the request. Use only user and project names \
                      that appear in the context. Resolve relative dates such as \"tomorrow\" \
                      against today's date.",
        fields: TASK_FIELDS,
    },
    IntentSchema {
        kind: IntentKind::EventAction,
        instruction: "Decide whether the request creates, updates or deletes calendar events. \
                      For update or delete, list the ids of the matching events from the \
                      context; never invent ids. For update, include only the fields that change.",
        fields: EVENT_FIELDS,
    },
    IntentSchema {
        kind: IntentKind::AnalyzeMeeting,
        instruction: "Read the meeting notes. Extract the minutes and every follow-up action \
                      item with its owner and deadline when stated.",
        fields: MEETING_FIELDS,
    },
    IntentSchema {
        kind: IntentKind::GenerateProjectPlan,
        instruction: "Break the project brief into ordered phases of concrete tasks with \
                      estimated working days and checklists.",
        fields: PLAN_FIELDS,
    },
    IntentSchema {
        kind: IntentKind::GenerateTemplate,
        instruction: "Draft a reusable work-breakdown template for the described kind of work: \
                      phases, tasks with estimated days, core flags and checklists.",
        fields: TEMPLATE_FIELDS,
    },
];

/// Lookup of the schema for each intent kind
pub struct SchemaRegistry;

impl SchemaRegistry {
    pub fn schema(kind: IntentKind) -> &'static IntentSchema {
        match kind {
            IntentKind::CreateTask => &SCHEMAS[0],
            IntentKind::EventAction => &SCHEMAS[1],
            IntentKind::AnalyzeMeeting => &SCHEMAS[2],
            IntentKind::GenerateProjectPlan => &SCHEMAS[3],
            IntentKind::GenerateTemplate => &SCHEMAS[4],
        }
    }

    pub fn validate(kind: IntentKind, value: &Value) -> Result<IntentSkeleton, SchemaViolation> {
        Self::schema(kind).validate(value)
    }
}

impl IntentSchema {
    /// Render the field list for the prompt
    pub fn describe(&self) -> String {
        let mut s = String::from("Return one JSON object with these fields:\n");
        describe_fields(self.fields, 0, &mut s);
        s
    }

    /// Check every field, then build the typed skeleton
    pub fn validate(&self, value: &Value) -> Result<IntentSkeleton, SchemaViolation> {
        let Some(obj) = value.as_object() else {
            return Err(SchemaViolation {
                kind: self.kind,
                violations: vec![FieldViolation {
                    path: "$".into(),
                    problem: format!("expected object, got {}", type_name(value)),
                }],
            });
        };

        let mut violations = Vec::new();
        check_fields(obj, self.fields, "", &mut violations);
        if !violations.is_empty() {
            return Err(SchemaViolation {
                kind: self.kind,
                violations,
            });
        }

        Ok(match self.kind {
            IntentKind::CreateTask => IntentSkeleton::CreateTask(TaskDraft::from_object(obj)),
            IntentKind::EventAction => IntentSkeleton::EventAction(EventDraft::from_object(obj)),
            IntentKind::AnalyzeMeeting => {
                IntentSkeleton::AnalyzeMeeting(MeetingDraft::from_object(obj))
            }
            IntentKind::GenerateProjectPlan => {
                IntentSkeleton::GenerateProjectPlan(PlanDraft::from_object(obj))
            }
            IntentKind::GenerateTemplate => {
                IntentSkeleton::GenerateTemplate(TemplateDraft::from_object(obj))
            }
        })
    }
}

fn describe_fields(fields: &[FieldSpec], depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for spec in fields {
        let presence = match spec.presence {
            Required => "required",
            Nullable => "required, may be null",
            Optional => "optional",
        };
        out.push_str(&format!(
            "{}- {}: {} ({}): {}\n",
            indent,
            spec.name,
            spec.ty.describe(),
            presence,
            spec.hint
        ));
        if let Records(item_fields) = spec.ty {
            describe_fields(item_fields, depth + 1, out);
        }
    }
}

// ============================================================================
// Violations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Dotted path, e.g. `action_items[2].title`
    pub path: String,
    pub problem: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub kind: IntentKind,
    pub violations: Vec<FieldViolation>,
}

impl SchemaViolation {
    pub fn paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.path.as_str()).collect()
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} output violates schema: ", self.kind)?;
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.path, v.problem)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaViolation {}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn is_reference(value: &Value) -> bool {
    value.is_string() || value.is_i64()
}

fn check_fields(
    obj: &Map<String, Value>,
    fields: &[FieldSpec],
    prefix: &str,
    violations: &mut Vec<FieldViolation>,
) {
    for spec in fields {
        let path = join_path(prefix, spec.name);
        match (obj.get(spec.name), spec.presence) {
            (None, Required | Nullable) => violations.push(FieldViolation {
                path,
                problem: "missing required field".into(),
            }),
            (Some(Value::Null), Required) => violations.push(FieldViolation {
                path,
                problem: "must not be null".into(),
            }),
            (None, Optional) | (Some(Value::Null), _) => {}
            (Some(value), _) => check_type(value, spec.ty, &path, violations),
        }
    }
}

fn check_type(value: &Value, ty: FieldType, path: &str, violations: &mut Vec<FieldViolation>) {
    let mismatch = |expected: &str| FieldViolation {
        path: path.to_string(),
        problem: format!("expected {}, got {}", expected, type_name(value)),
    };

    match ty {
        Text | Date | Timestamp => {
            if !value.is_string() {
                violations.push(mismatch("string"));
            }
        }
        Integer => {
            if !value.is_i64() {
                violations.push(mismatch("integer"));
            }
        }
        Boolean => {
            if !value.is_boolean() {
                violations.push(mismatch("boolean"));
            }
        }
        Reference => {
            if !is_reference(value) {
                violations.push(mismatch("string or integer"));
            }
        }
        ReferenceList | IdList | TextList => {
            let Some(items) = value.as_array() else {
                violations.push(mismatch("array"));
                return;
            };
            for (i, item) in items.iter().enumerate() {
                let ok = match ty {
                    ReferenceList => is_reference(item),
                    IdList => item.is_i64(),
                    _ => item.is_string(),
                };
                if !ok {
                    violations.push(FieldViolation {
                        path: format!("{}[{}]", path, i),
                        problem: format!("unexpected {}", type_name(item)),
                    });
                }
            }
        }
        OneOf(options) => match value.as_str() {
            Some(s) if options.iter().any(|o| o.eq_ignore_ascii_case(s.trim())) => {}
            Some(s) => violations.push(FieldViolation {
                path: path.to_string(),
                problem: format!("\"{}\" is not one of {}", s, options.join("|")),
            }),
            None => violations.push(mismatch("string")),
        },
        Records(item_fields) => {
            let Some(items) = value.as_array() else {
                violations.push(mismatch("array"));
                return;
            };
            for (i, item) in items.iter().enumerate() {
                let item_path = format!("{}[{}]", path, i);
                match item.as_object() {
                    Some(item_obj) => check_fields(item_obj, item_fields, &item_path, violations),
                    None => violations.push(FieldViolation {
                        path: item_path,
                        problem: format!("expected object, got {}", type_name(item)),
                    }),
                }
            }
        }
    }
}

// ============================================================================
// Skeletons (validated, not yet resolved)
// ============================================================================

/// A reference as the model wrote it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawRef {
    Name(String),
    Id(i64),
}

impl RawRef {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RawRef::Name(s.clone())),
            Value::Number(n) => n.as_i64().map(RawRef::Id),
            _ => None,
        }
    }
}

fn text(obj: &Map<String, Value>, name: &str) -> Option<String> {
    obj.get(name).and_then(Value::as_str).map(str::to_string)
}

fn integer(obj: &Map<String, Value>, name: &str) -> Option<i64> {
    obj.get(name).and_then(Value::as_i64)
}

fn boolean(obj: &Map<String, Value>, name: &str) -> Option<bool> {
    obj.get(name).and_then(Value::as_bool)
}

fn reference(obj: &Map<String, Value>, name: &str) -> Option<RawRef> {
    obj.get(name).and_then(RawRef::from_value)
}

fn array<'a>(obj: &'a Map<String, Value>, name: &str) -> &'a [Value] {
    obj.get(name)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn references(obj: &Map<String, Value>, name: &str) -> Vec<RawRef> {
    array(obj, name).iter().filter_map(RawRef::from_value).collect()
}

fn texts(obj: &Map<String, Value>, name: &str) -> Vec<String> {
    array(obj, name)
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn records<T>(obj: &Map<String, Value>, name: &str, build: impl Fn(&Map<String, Value>) -> T) -> Vec<T> {
    array(obj, name)
        .iter()
        .filter_map(Value::as_object)
        .map(build)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub assignees: Vec<RawRef>,
    pub project: Option<RawRef>,
    pub department: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
}

impl TaskDraft {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            title: text(obj, "title").unwrap_or_default(),
            description: text(obj, "description"),
            assignees: references(obj, "assignees"),
            project: reference(obj, "project"),
            department: text(obj, "department"),
            status: text(obj, "status"),
            start_date: text(obj, "start_date"),
            due_date: text(obj, "due_date"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventVerb {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub action: EventVerb,
    pub event_ids: Vec<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub all_day: Option<bool>,
    pub location: Option<String>,
    pub assignee: Option<RawRef>,
}

impl EventDraft {
    fn from_object(obj: &Map<String, Value>) -> Self {
        let action = match text(obj, "action")
            .map(|a| a.trim().to_lowercase())
            .as_deref()
        {
            Some("update") => EventVerb::Update,
            Some("delete") => EventVerb::Delete,
            _ => EventVerb::Create,
        };
        Self {
            action,
            event_ids: array(obj, "event_ids").iter().filter_map(Value::as_i64).collect(),
            title: text(obj, "title"),
            description: text(obj, "description"),
            start: text(obj, "start"),
            end: text(obj, "end"),
            all_day: boolean(obj, "all_day"),
            location: text(obj, "location"),
            assignee: reference(obj, "assignee"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionItemDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<RawRef>,
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeetingDraft {
    pub topic: String,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub attendees: Vec<String>,
    pub summary: Option<String>,
    pub action_items: Vec<ActionItemDraft>,
}

impl MeetingDraft {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            topic: text(obj, "topic").unwrap_or_default(),
            date: text(obj, "date"),
            time: text(obj, "time"),
            location: text(obj, "location"),
            attendees: texts(obj, "attendees"),
            summary: text(obj, "summary"),
            action_items: records(obj, "action_items", |item| ActionItemDraft {
                title: text(item, "title"),
                description: text(item, "description"),
                assignee: reference(item, "assignee"),
                due_date: text(item, "due_date"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanTaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_days: Option<i64>,
    pub assignee: Option<RawRef>,
    pub is_core: Option<bool>,
    pub checklist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseDraft {
    pub phase_name: Option<String>,
    pub tasks: Vec<PlanTaskDraft>,
}

fn phases(obj: &Map<String, Value>) -> Vec<PhaseDraft> {
    records(obj, "phases", |phase| PhaseDraft {
        phase_name: text(phase, "phase_name"),
        tasks: records(phase, "tasks", |task| PlanTaskDraft {
            title: text(task, "title"),
            description: text(task, "description"),
            estimated_days: integer(task, "estimated_days"),
            assignee: reference(task, "assignee"),
            is_core: boolean(task, "is_core"),
            checklist: texts(task, "checklist"),
        }),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanDraft {
    pub project_name: String,
    pub project: Option<RawRef>,
    pub description: Option<String>,
    pub department: Option<String>,
    pub start_date: Option<String>,
    pub phases: Vec<PhaseDraft>,
}

impl PlanDraft {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            project_name: text(obj, "project_name").unwrap_or_default(),
            project: reference(obj, "project"),
            description: text(obj, "description"),
            department: text(obj, "department"),
            start_date: text(obj, "start_date"),
            phases: phases(obj),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub phases: Vec<PhaseDraft>,
}

impl TemplateDraft {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            name: text(obj, "name").unwrap_or_default(),
            category: text(obj, "category"),
            description: text(obj, "description"),
            phases: phases(obj),
        }
    }
}

/// Validated model output, still in free-text form
#[derive(Debug, Clone, PartialEq)]
pub enum IntentSkeleton {
    CreateTask(TaskDraft),
    EventAction(EventDraft),
    AnalyzeMeeting(MeetingDraft),
    GenerateProjectPlan(PlanDraft),
    GenerateTemplate(TemplateDraft),
}

impl IntentSkeleton {
    pub fn kind(&self) -> IntentKind {
        match self {
            IntentSkeleton::CreateTask(_) => IntentKind::CreateTask,
            IntentSkeleton::EventAction(_) => IntentKind::EventAction,
            IntentSkeleton::AnalyzeMeeting(_) => IntentKind::AnalyzeMeeting,
            IntentSkeleton::GenerateProjectPlan(_) => IntentKind::GenerateProjectPlan,
            IntentSkeleton::GenerateTemplate(_) => IntentKind::GenerateTemplate,
        }
    }
}
