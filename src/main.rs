use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adherence_core::config::{
    data_dir_from_env_value, date_label_format_from_env_value,
    dispatch_queue_capacity_from_env_value,
};
use adherence_core::screens::{CaregiverEvent, CaregiverModel, CaregiverStore};
use adherence_core::{CoreConfig, JsonFileGateway, MedicationId, SystemDateLabel, UiSnapshot, UserId};

/// A line typed at the dashboard prompt.
#[derive(Debug, PartialEq)]
enum Command {
    Event(CaregiverEvent),
    Json,
    Help,
    Quit,
}

/// Main entry point for the caregiver dashboard
///
/// Opens the JSON store, starts a caregiver store for one patient and renders every snapshot
/// it publishes. Commands are read line by line from stdin.
///
/// # Environment Variables
/// - `ADHERENCE_DATA_DIR`: Directory holding `adherence.json` (default: "adherence_data")
/// - `ADHERENCE_DATE_FORMAT`: strftime pattern for the date label (default: "%a, %b %-d")
/// - `ADHERENCE_QUEUE_CAPACITY`: Dispatch queue capacity (default: 64)
/// - `ADHERENCE_OWNER_ID`: Patient whose medications are shown (default: 1)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adherence=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = Arc::new(CoreConfig::new(
        data_dir_from_env_value(std::env::var("ADHERENCE_DATA_DIR").ok()),
        date_label_format_from_env_value(std::env::var("ADHERENCE_DATE_FORMAT").ok()),
        dispatch_queue_capacity_from_env_value(std::env::var("ADHERENCE_QUEUE_CAPACITY").ok())?,
    )?);
    let owner: UserId = std::env::var("ADHERENCE_OWNER_ID")
        .unwrap_or_else(|_| "1".into())
        .parse()?;

    tracing::info!(
        "++ Starting caregiver dashboard for owner {} (data in {})",
        owner,
        cfg.data_dir().display()
    );

    let gateway = Arc::new(JsonFileGateway::open(&cfg).await?);
    let labels = Arc::new(SystemDateLabel::from_config(&cfg));
    let store = CaregiverStore::with_config(CaregiverModel::new(gateway, owner, labels), &cfg);

    let (initial, mut updates) = store.subscribe().into_parts();
    render(&initial);
    let renderer = tokio::spawn(async move {
        while let Some(snapshot) = updates.next().await {
            render(&snapshot);
        }
    });

    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Command::Event(CaregiverEvent::ContactAction)) => {
                println!("Contacting the doctor...");
                store.dispatch(CaregiverEvent::ContactAction).await;
            }
            Ok(Command::Event(event)) => store.dispatch(event).await,
            Ok(Command::Json) => {
                store.flush().await;
                println!("{}", serde_json::to_string_pretty(&*store.current())?);
            }
            Ok(Command::Help) => print_help(),
            Ok(Command::Quit) => break,
            Err(message) => eprintln!("{}", message),
        }
    }

    store.flush().await;
    drop(store);
    // the update stream ends once the store is gone
    renderer.await?;

    tracing::info!("-- Caregiver dashboard closed");
    Ok(())
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Help);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "toggle" | "t" => {
            let id = words
                .next()
                .ok_or_else(|| "usage: toggle <medication id>".to_string())?
                .parse::<MedicationId>()
                .map_err(|e| format!("invalid medication id: {}", e))?;
            Command::Event(CaregiverEvent::ToggleTaken(id))
        }
        "refresh" | "r" => Command::Event(CaregiverEvent::Refresh),
        "reload" => Command::Event(CaregiverEvent::Reload),
        "contact" | "c" => Command::Event(CaregiverEvent::ContactAction),
        "json" => Command::Json,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}'; type 'help'", other)),
    };
    Ok(command)
}

fn print_help() {
    println!("Commands: toggle <id> | refresh | reload | contact | json | help | quit");
}

fn render(snapshot: &UiSnapshot) {
    if snapshot.is_loading() {
        println!("{} - loading...", snapshot.date_label());
        return;
    }

    println!();
    println!("== {} ==", snapshot.date_label());
    if let Some(error) = snapshot.error() {
        println!("!! {}", error);
    }
    for item in snapshot.items() {
        let mark = if item.taken() { "x" } else { " " };
        println!("[{}] {:>4}  {}  {}", mark, item.id(), item.time(), item.name());
    }
    println!(
        "Progress: {}% ({}/{} taken)",
        snapshot.progress_percent(),
        snapshot.taken_count(),
        snapshot.total()
    );
}
