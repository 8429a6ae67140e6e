use adherence_core::config::{
    data_dir_from_env_value, date_label_format_from_env_value,
    dispatch_queue_capacity_from_env_value,
};
use adherence_core::screens::{
    CaregiverModel, HistoryEvent, HistoryModel, LoginEvent, LoginModel, LoginSnapshot,
    ProfileEvent, ProfileModel, ProfileUpdate, Registration, SettingsEvent, SettingsModel,
};
use adherence_core::{
    CoreConfig, IntakeStatus, JsonFileGateway, MedicationId, NewIntake, NewMedication,
    PersistenceGateway, Store, SystemDateLabel, UiSnapshot, UserId,
};
use adherence_types::NonEmptyText;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "adherence")]
#[command(about = "Medication adherence CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Register {
        username: String,
        first_name: String,
        last_name: String,
        email: String,
        password: String,
        /// Register as a caregiver instead of a patient
        #[arg(long)]
        caregiver: bool,
    },
    /// Check credentials and show the resulting session
    Login { username: String, password: String },
    /// Add a medication for a patient
    AddMedication {
        /// Owning user id
        owner: UserId,
        name: String,
        /// Time of day shown on the dashboard, e.g. 08:00
        time: String,
        #[arg(long)]
        dosage: Option<String>,
        #[arg(long)]
        frequency: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
    },
    /// Remove a medication by id
    RemoveMedication { id: MedicationId },
    /// Show today's dashboard for a patient
    Medications { owner: UserId },
    /// Show intake history for a patient
    History {
        owner: UserId,
        /// Only show entries with this status (taken, missed, skipped)
        #[arg(long)]
        status: Option<IntakeStatus>,
    },
    /// Record a past intake
    RecordIntake {
        owner: UserId,
        medication: String,
        /// taken, missed or skipped
        status: IntakeStatus,
        /// Defaults to the owner's display name
        #[arg(long)]
        patient_name: Option<String>,
        /// Defaults to "Today, HH:MM"
        #[arg(long)]
        when: Option<String>,
    },
    /// Show or set the dark mode preference
    DarkMode {
        /// on or off; omit to show the current value
        value: Option<String>,
    },
    /// Show a user's profile
    Profile { user_id: UserId },
    /// Update a user's profile. Omitted fields keep their current value.
    UpdateProfile {
        user_id: UserId,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Pass an empty string to clear
        #[arg(long)]
        phone: Option<String>,
    },
}

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

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'adherence --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::new(
        data_dir_from_env_value(std::env::var("ADHERENCE_DATA_DIR").ok()),
        date_label_format_from_env_value(std::env::var("ADHERENCE_DATE_FORMAT").ok()),
        dispatch_queue_capacity_from_env_value(std::env::var("ADHERENCE_QUEUE_CAPACITY").ok())?,
    )?;
    let gateway: Arc<dyn PersistenceGateway> = Arc::new(JsonFileGateway::open(&cfg).await?);

    match command {
        Commands::Register {
            username,
            first_name,
            last_name,
            email,
            password,
            caregiver,
        } => {
            let registration = Registration {
                username,
                first_name,
                last_name,
                email,
                password,
                patient: !caregiver,
            };
            let snapshot = run_login(&cfg, &gateway, LoginEvent::Register(registration)).await;
            match (&snapshot.session, &snapshot.error) {
                (Some(session), _) => println!(
                    "Registered {} ({}) with ID: {}",
                    session.display_name, session.role, session.user_id
                ),
                (None, Some(error)) => eprintln!("Error registering: {}", error),
                (None, None) => eprintln!("Error registering: no session was opened"),
            }
        }
        Commands::Login { username, password } => {
            let snapshot =
                run_login(&cfg, &gateway, LoginEvent::Login { username, password }).await;
            match (&snapshot.session, &snapshot.error) {
                (Some(session), _) => println!(
                    "Logged in as {} ({}), ID: {}",
                    session.display_name, session.role, session.user_id
                ),
                (None, Some(error)) => eprintln!("Error logging in: {}", error),
                (None, None) => eprintln!("Error logging in: no session was opened"),
            }
        }
        Commands::AddMedication {
            owner,
            name,
            time,
            dosage,
            frequency,
            description,
            start_date,
            end_date,
        } => {
            let mut new = NewMedication::new(owner, NonEmptyText::new(&name)?, NonEmptyText::new(&time)?);
            new.dosage = dosage;
            new.frequency = frequency;
            new.description = description;
            new.start_date = start_date;
            new.end_date = end_date;
            match gateway.add_medication(new).await {
                Ok(medication) => println!(
                    "Added medication {} with ID: {}",
                    medication.name, medication.id
                ),
                Err(e) => eprintln!("Error adding medication: {}", e),
            }
        }
        Commands::RemoveMedication { id } => match gateway.remove_medication(id).await {
            Ok(true) => println!("Removed medication with ID: {}", id),
            Ok(false) => println!("No medication with ID: {}", id),
            Err(e) => eprintln!("Error removing medication: {}", e),
        },
        Commands::Medications { owner } => {
            let labels = Arc::new(SystemDateLabel::from_config(&cfg));
            let store = Store::with_config(CaregiverModel::new(gateway.clone(), owner, labels), &cfg);
            store.flush().await;
            print_dashboard(&store.current());
        }
        Commands::History { owner, status } => {
            let store = Store::with_config(HistoryModel::new(gateway.clone(), owner), &cfg);
            store.dispatch(HistoryEvent::Filter(status)).await;
            store.flush().await;
            let snapshot = store.current();
            if let Some(error) = &snapshot.error {
                eprintln!("Error loading history: {}", error);
            } else if snapshot.visible().is_empty() {
                println!("No history found.");
            } else {
                for entry in snapshot.visible() {
                    println!(
                        "{:<10} {:<24} {:<16} {}",
                        entry.status, entry.medication_name, entry.patient_name, entry.when_text
                    );
                }
            }
        }
        Commands::RecordIntake {
            owner,
            medication,
            status,
            patient_name,
            when,
        } => {
            let patient_name = match patient_name {
                Some(name) => name,
                None => gateway
                    .find_user(owner)
                    .await?
                    .map(|user| user.display_name())
                    .unwrap_or_else(|| format!("User {}", owner)),
            };
            let now = chrono::Utc::now();
            let when_text = when.unwrap_or_else(|| {
                now.with_timezone(&chrono::Local)
                    .format("Today, %H:%M")
                    .to_string()
            });
            let new = NewIntake {
                owner,
                patient_name,
                medication_name: NonEmptyText::new(&medication)?,
                status,
                when_text,
                recorded_at: now,
            };
            match gateway.record_intake(new).await {
                Ok(intake) => println!("Recorded intake with ID: {}", intake.id),
                Err(e) => eprintln!("Error recording intake: {}", e),
            }
        }
        Commands::DarkMode { value } => {
            let store = Store::with_config(SettingsModel::new(gateway.clone()), &cfg);
            if let Some(value) = value {
                let enabled = parse_switch(&value)?;
                store.dispatch(SettingsEvent::SetDarkMode(enabled)).await;
            }
            store.flush().await;
            let snapshot = store.current();
            match &snapshot.error {
                Some(error) => eprintln!("Error: {}", error),
                None => println!(
                    "Dark mode: {}",
                    if snapshot.dark_mode { "on" } else { "off" }
                ),
            }
        }
        Commands::Profile { user_id } => {
            let store = Store::with_config(ProfileModel::new(gateway.clone(), user_id), &cfg);
            store.flush().await;
            let snapshot = store.current();
            match (&snapshot.user, &snapshot.error) {
                (Some(user), _) => {
                    println!("ID: {}", user.id);
                    println!("Username: {}", user.username);
                    println!("Name: {}", user.display_name());
                    println!("Email: {}", user.email.as_str());
                    println!("Phone: {}", user.phone_number.as_deref().unwrap_or("-"));
                    println!("Role: {}", user.role());
                }
                (None, Some(error)) => eprintln!("Error loading profile: {}", error),
                (None, None) => eprintln!("Error loading profile: nothing loaded"),
            }
        }
        Commands::UpdateProfile {
            user_id,
            first_name,
            last_name,
            email,
            phone,
        } => {
            let store = Store::with_config(ProfileModel::new(gateway.clone(), user_id), &cfg);
            store.flush().await;
            let Some(user) = store.current().user.clone() else {
                eprintln!(
                    "Error loading profile: {}",
                    store.current().error.as_deref().unwrap_or("nothing loaded")
                );
                return Ok(());
            };

            let update = ProfileUpdate {
                first_name: first_name.unwrap_or_else(|| user.first_name.as_str().to_owned()),
                last_name: last_name.unwrap_or_else(|| user.last_name.as_str().to_owned()),
                email: email.unwrap_or_else(|| user.email.as_str().to_owned()),
                phone_number: phone.or(user.phone_number).unwrap_or_default(),
            };
            store.dispatch(ProfileEvent::Update(update)).await;
            store.flush().await;
            match &store.current().error {
                Some(error) => eprintln!("Error updating profile: {}", error),
                None => println!("Updated profile for user ID: {}", user_id),
            }
        }
    }

    Ok(())
}

async fn run_login(
    cfg: &CoreConfig,
    gateway: &Arc<dyn PersistenceGateway>,
    event: LoginEvent,
) -> Arc<LoginSnapshot> {
    let store = Store::with_config(LoginModel::new(gateway.clone()), cfg);
    store.dispatch(event).await;
    store.flush().await;
    store.current()
}

fn parse_switch(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => anyhow::bail!("expected 'on' or 'off', got '{}'", other),
    }
}

fn print_dashboard(snapshot: &UiSnapshot) {
    println!("{}", snapshot.date_label());
    if let Some(error) = snapshot.error() {
        eprintln!("Warning: {}", error);
    }
    if snapshot.items().is_empty() {
        println!("No medications found.");
        return;
    }
    for item in snapshot.items() {
        println!(
            "ID: {}, {} at {}{}",
            item.id(),
            item.name(),
            item.time(),
            if item.taken() { " (taken)" } else { "" }
        );
    }
    println!(
        "Progress: {}% ({}/{})",
        snapshot.progress_percent(),
        snapshot.taken_count(),
        snapshot.total()
    );
}
