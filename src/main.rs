use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mms_download_state::capability::ColumnProbe;
use mms_download_state::config::{AppConfig, CliConfig, FileConfig};
use mms_download_state::download_manager::{
    DownloadPolicy, DownloadState, DownloadStateManager, LogNotifier, ManagerSlot, MessageId,
    MessageRecord, NotificationDispatcher, SqliteRecordStore, DEFAULT_QUEUE_CAPACITY,
};
use mms_download_state::metrics;
use mms_download_state::settings::{SettingsAccessor, SqlitePropertySource};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH")))]
struct CliArgs {
    /// Directory holding the notification and settings databases.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Maximum number of user notices waiting for delivery.
    #[clap(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// Print metrics in the Prometheus text format before exiting.
    #[clap(long)]
    pub print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stores a new MMS notification record.
    Add {
        id: MessageId,
        /// Unix timestamp (seconds) after which the message is expired.
        #[clap(long)]
        expiry: i64,
        #[clap(long)]
        subject: Option<String>,
    },

    /// Moves a message to the given download state.
    Mark {
        id: MessageId,
        #[clap(value_enum)]
        state: DownloadState,
    },

    /// Shows the download state of a message.
    State { id: MessageId },

    /// Shows whether messages are downloaded automatically.
    Auto,

    /// Shows whether the optional subscription column is available.
    Probe,

    /// Shows a notice for a transport error code.
    ErrorCode { code: i32 },

    /// Shows the stored value of a setting.
    GetSetting { key: String },

    /// Stores a setting.
    SetSetting { key: String, value: String },
}

fn run_command(
    command: Command,
    slot: &ManagerSlot,
    store: &SqliteRecordStore,
    settings: &SettingsAccessor,
) -> Result<()> {
    match command {
        Command::Add {
            id,
            expiry,
            subject,
        } => {
            let mut record = MessageRecord::new(id, expiry);
            record.subject = subject;
            store.insert(&record)?;
            println!("Added message {}", id);
        }
        Command::Mark { id, state } => {
            let manager = slot.get()?;
            manager.mark_state(id, state);
            println!("{}", manager.get_state(id));
        }
        Command::State { id } => println!("{}", slot.get()?.get_state(id)),
        Command::Auto => println!("{}", slot.get()?.is_auto()),
        Command::Probe => println!("{}", slot.get()?.supports_optional_column()),
        Command::ErrorCode { code } => slot.get()?.show_error_code_toast(code),
        Command::GetSetting { key } => println!("{}", settings.get_string_or_empty(&key)?),
        Command::SetSetting { key, value } => settings.set(&key, &value)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir.clone(),
        notification_queue_capacity: cli_args.queue_capacity,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    metrics::init_metrics();

    info!("Opening settings database at {:?}...", config.settings_db_path());
    let settings = SettingsAccessor::new(Arc::new(SqlitePropertySource::new(
        config.settings_db_path(),
    )?));

    info!("Opening notification database at {:?}...", config.records_db_path());
    let store = Arc::new(SqliteRecordStore::new(config.records_db_path())?);
    let probe = ColumnProbe::new(store.clone());

    let slot = ManagerSlot::new();
    slot.init(DownloadStateManager::new(
        store.clone(),
        NotificationDispatcher::spawn(Arc::new(LogNotifier), config.notification_queue_capacity),
        &settings,
        &probe,
        DownloadPolicy::new(&config.download_policy),
    )?);

    let result = run_command(cli_args.command, &slot, &store, &settings);
    slot.get()?.shutdown().await;
    result?;

    if cli_args.print_metrics {
        print!("{}", metrics::encode_metrics()?);
    }
    Ok(())
}
