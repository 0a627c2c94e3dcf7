use async_trait::async_trait;
use clap::{Parser, Subcommand};
use nstack_cache::{FileStore, KeyValueStore};
use nstack_client::{HttpTransport, NStackClient, StoreLocalizationRefresher};
use nstack_config::{get_data_path, Configuration};
use nstack_core::{
    AlertInProgress, AlertPresenter, Changelog, Collaborators, CycleOutcome, Message,
    NewerVersion, RateReminder, UpdateCoordinator,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nstack")]
#[command(about = "A CLI for exercising the NStack app-open flow")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(long, default_value = "nstack.json")]
    config: PathBuf,

    /// Key-value store file; defaults to the platform data directory
    #[arg(long)]
    store: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the start-up app-open cycle
    Open {
        /// Launch option keys, as the host application received them
        #[arg(long = "launch-option")]
        launch_options: Vec<String>,
    },
    /// Print the persisted sync state
    State,
    /// Forget the persisted sync state
    Reset,
    /// List countries
    Countries {
        /// Read the stored list instead of fetching
        #[arg(long)]
        cached: bool,
    },
    /// List available translation languages
    Languages,
    /// Check an email address with the validator endpoint
    ValidateEmail { email: String },
}

/// Prints alerts; a terminal has nothing to keep open, so every alert
/// is dismissed right after printing.
struct ConsolePresenter;

#[async_trait]
impl AlertPresenter for ConsolePresenter {
    async fn present_update(&self, update: &NewerVersion, alert: AlertInProgress) {
        let kind = if update.is_mandatory() { "Required update" } else { "Update" };
        println!("{}: version {} is available", kind, update.version);
        if let Some(link) = &update.link {
            println!("  {}", link);
        }
        alert.dismiss();
    }

    async fn present_whats_new(&self, changelog: &Changelog, alert: AlertInProgress) {
        println!("What's new in {}:", changelog.version);
        println!("  {}", changelog.translate.message);
        alert.dismiss();
    }

    async fn present_message(&self, message: &Message, alert: AlertInProgress) {
        println!("Message #{}: {}", message.id, message.message);
        alert.dismiss();
    }

    async fn present_rate_reminder(&self, reminder: &RateReminder, alert: AlertInProgress) {
        println!("{} {}", reminder.title, reminder.body);
        alert.dismiss();
    }
}

fn print_outcome(outcome: Option<CycleOutcome>) {
    match outcome {
        Some(CycleOutcome::Completed(report)) => {
            if report.alert.is_none() {
                println!("No alert");
            }
            if report.localization_refreshed {
                println!(
                    "Localizations refreshed{}",
                    if report.forced_localization_refresh { " (forced)" } else { "" }
                );
            }
            if let Some(e) = &report.localization_error {
                println!("{}", e);
            }
            for e in &report.field_errors {
                println!("Ignored {}", e);
            }
            println!("Synced at {}", report.synced_at.to_rfc3339());
        }
        Some(CycleOutcome::Skipped) => println!("Another cycle is in flight"),
        None => println!("No cycle run on start"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .init();

    let config = Configuration::load(&cli.config)?;
    let store_path = match cli.store {
        Some(path) => path,
        None => get_data_path("store.json")?,
    };
    tracing::debug!(config = %cli.config.display(), store = %store_path.display(), "starting");
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&store_path));
    let transport = Arc::new(HttpTransport::new());

    let coordinator = UpdateCoordinator::new(
        config.clone(),
        Collaborators {
            transport: transport.clone(),
            store: store.clone(),
            presenter: Arc::new(ConsolePresenter),
            localization: Some(Arc::new(StoreLocalizationRefresher::new(
                config.clone(),
                transport.clone(),
                store.clone(),
            ))),
        },
    );
    let client = NStackClient::new(config, transport, store);

    match cli.command {
        Commands::Open { launch_options } => {
            let outcome = coordinator.start(&launch_options).await?;
            print_outcome(outcome);
        }
        Commands::State => {
            let state = coordinator.sync_state().await?;
            println!("Current version:  {}", state.current_app_version);
            println!("Previous version: {}", state.previous_app_version);
            println!(
                "Accept-Language:  {}",
                state.last_accept_language_used.as_deref().unwrap_or("-")
            );
            if state.has_synced() {
                println!("Last sync:        {}", state.last_sync_timestamp.to_rfc3339());
            } else {
                println!("Last sync:        never");
            }
        }
        Commands::Reset => {
            coordinator.reset_sync_state().await?;
            println!("Sync state cleared");
        }
        Commands::Countries { cached } => {
            let countries = if cached {
                client.cached_countries().await?
            } else {
                client.update_countries().await?
            };
            for country in countries {
                println!("{}\t{}", country.code, country.name);
            }
        }
        Commands::Languages => {
            let languages = client.fetch_available_languages().await?;
            println!("{}", serde_json::to_string_pretty(&languages)?);
        }
        Commands::ValidateEmail { email } => {
            let ok = client.validate_email(&email).await?;
            println!("{}: {}", email, if ok { "valid" } else { "invalid" });
        }
    }

    Ok(())
}
