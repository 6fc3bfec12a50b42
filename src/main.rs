//! Bizdesk - Entry Point
//!
//! Runs natural-language requests against an in-memory tracker seeded with
//! demo users, projects and calendar events. Pass the request as an argument
//! for a one-shot run, or omit it for an interactive prompt.

use bizdesk::command::{ApplyReport, Engine};
use bizdesk::core::error::Result;
use bizdesk::core::types::{Department, EventId, ProjectId, Role, UserId};
use bizdesk::core::EngineConfig;
use bizdesk::domain::model::{Event, Project, ProjectStatus, User};
use bizdesk::domain::MemoryStore;
use bizdesk::llm::client::LlmClient;
use bizdesk::llm::{IntentKind, ModelInvoker};
use chrono::{Duration, Local, NaiveDateTime};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Natural-language commands for the business tracker
#[derive(Parser, Debug)]
#[command(name = "bizdesk")]
#[command(about = "Interpret free-form requests into tasks, events, minutes and plans")]
struct Args {
    /// Engine configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Acting user id
    #[arg(long, default_value_t = 1)]
    user: i64,

    /// Request kind: create-task, event, meeting, plan or template
    #[arg(long, default_value = "create-task")]
    kind: IntentKind,

    /// Request text; omit for interactive mode
    text: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bizdesk=info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::new(),
    };
    tracing::info!("Bizdesk starting (model {})", config.model.model);

    let client = LlmClient::from_config(&config.model)?;
    let invoker = ModelInvoker::new(Arc::new(client), config.retry.clone());

    let store = Arc::new(MemoryStore::new());
    seed_demo_data(&store, Local::now().naive_local());

    let engine = Engine::new(store.clone(), invoker, config);
    let rt = Runtime::new()?;

    if let Some(text) = &args.text {
        let report = rt.block_on(engine.interpret_and_apply(args.kind, text, UserId(args.user)))?;
        print_report(&report);
        return Ok(());
    }

    run_interactive(&rt, &engine, args.kind, UserId(args.user))
}

fn run_interactive(
    rt: &Runtime,
    engine: &Engine,
    mut kind: IntentKind,
    mut user: UserId,
) -> Result<()> {
    println!("\n=== BIZDESK ===");
    println!("Commands:");
    println!("  :kind <kind>    - Switch request kind (task, event, meeting, plan, template)");
    println!("  :user <id>      - Act as another user");
    println!("  quit / q        - Exit");
    println!("  <any text>      - Request interpreted as the current kind");
    println!();

    loop {
        print!("[{} as {}] > ", kind, user);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            break;
        }

        if let Some(value) = input.strip_prefix(":kind ") {
            match value.parse::<IntentKind>() {
                Ok(k) => kind = k,
                Err(e) => println!("{}", e),
            }
            continue;
        }

        if let Some(value) = input.strip_prefix(":user ") {
            match value.trim().parse::<i64>() {
                Ok(id) => user = UserId(id),
                Err(_) => println!("Usage: :user <id>"),
            }
            continue;
        }

        match rt.block_on(engine.interpret_and_apply(kind, input, user)) {
            Ok(report) => print_report(&report),
            Err(e) => println!("Request failed: {}", e),
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

fn print_report(report: &ApplyReport) {
    println!();
    println!(
        "{}: {}/{} applied",
        report.kind,
        report.applied_count(),
        report.outcomes.len()
    );
    if let Some(header) = &report.header {
        println!("  {}", header);
    }
    for outcome in &report.outcomes {
        println!("  {}", outcome);
    }
    if !report.created.is_empty() {
        let created: Vec<String> = report.created.iter().map(|r| r.to_string()).collect();
        println!("Created: {}", created.join(", "));
    }
    println!();
}

/// Seed the demo tracker
fn seed_demo_data(store: &MemoryStore, now: NaiveDateTime) {
    let users = [
        (1, "윤경식", Some(Department::Management), Role::Admin),
        (2, "이영희", Some(Department::Distribution), Role::User),
        (7, "김철수", Some(Department::System), Role::User),
        (8, "박민수", Some(Department::System), Role::User),
    ];
    for (id, name, department, role) in users {
        store.add_user(User {
            id: UserId(id),
            username: name.into(),
            department,
            role,
        });
    }

    store.add_project(Project {
        id: ProjectId(20),
        name: "ERP 구축".into(),
        description: Some("사내 ERP 도입".into()),
        start_date: Some(now.date()),
        end_date: None,
        status: ProjectStatus::InProgress,
        department: Some(Department::System),
    });

    let tomorrow = now.date() + Duration::days(1);
    let events = [
        (40, "김 과장 미팅", 14, 7),
        (41, "주간 회의", 10, 1),
    ];
    for (id, title, hour, creator) in events {
        if let Some(start) = tomorrow.and_hms_opt(hour, 0, 0) {
            store.add_event(Event {
                id: EventId(id),
                title: title.into(),
                description: None,
                start,
                end: Some(start + Duration::hours(1)),
                all_day: false,
                location: None,
                creator_id: UserId(creator),
                assignee_id: None,
            });
        }
    }
    tracing::info!("Seeded demo data: {} users", users.len());
}
