//! Kpwgen CLI - deterministic password generator
//!
//! The master key is read from `KPWGEN_MASTER_KEY` or prompted for; it is
//! never written to disk. Only the advanced parameters can be saved.

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use kpwgen_cli::commands::{self, GenerateOptions, ParamOverrides};
use kpwgen_core::{ExportFormat, FileStore, MasterSecret, SettingsStore, TtlChoice};

/// Kpwgen - deterministic passwords from one master key
#[derive(Parser, Debug)]
#[command(name = "kpwgen")]
#[command(version)]
#[command(about = "Kpwgen - deterministic passwords from one master key")]
struct Args {
    /// Directory for saved parameters
    #[arg(long, global = true, env = "KPWGEN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate passwords for space-separated platforms
    Generate {
        /// Platforms, e.g. "google github.com"
        #[arg(short, long)]
        platform: String,

        /// Accounts, one per platform
        #[arg(short, long, default_value = "")]
        account: String,

        #[command(flatten)]
        params: ParamOverrides,

        /// Master key (prompted for when not set)
        #[arg(long, env = "KPWGEN_MASTER_KEY", hide_env_values = true)]
        master_key: Option<String>,

        /// Export the history (csv or txt); may be repeated
        #[arg(long, value_name = "FORMAT")]
        export: Vec<ExportFormat>,

        /// Directory for exported files
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Copy the first password to the clipboard
        #[arg(long)]
        copy: bool,

        /// Show a strength rating next to each password
        #[arg(long)]
        strength: bool,
    },

    /// Manage saved advanced parameters
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    /// Save parameters (3h, 24h, 48h or none)
    Save {
        #[arg(long, default_value_t = TtlChoice::OneDay)]
        ttl: TtlChoice,

        #[command(flatten)]
        params: ParamOverrides,
    },
    /// Show saved parameters
    Show,
    /// Remove saved parameters
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays clean for piping passwords
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => FileStore::default_dir()?,
    };
    debug!("Using data directory {:?}", data_dir);
    let store = FileStore::open(data_dir)
        .await
        .map_err(|e| format!("Failed to open settings: {}", e))?;
    let settings = SettingsStore::new(Arc::new(store));

    let mut stdout = io::stdout();

    match args.command {
        Command::Generate {
            platform,
            account,
            params,
            master_key,
            export,
            out,
            copy,
            strength,
        } => {
            let secret = match master_key {
                Some(key) => MasterSecret::new(key),
                None => MasterSecret::new(rpassword::prompt_password("Master key: ")?),
            };
            let options = GenerateOptions {
                platforms: platform,
                accounts: account,
                overrides: params,
                export,
                out_dir: out,
                copy,
                strength,
            };
            commands::generate(&settings, secret, options, &mut stdout).await?;
        }
        Command::Settings { action } => match action {
            SettingsAction::Save { ttl, params } => {
                commands::settings_save(&settings, ttl, &params, &mut stdout).await?;
            }
            SettingsAction::Show => commands::settings_show(&settings, &mut stdout).await?,
            SettingsAction::Clear => commands::settings_clear(&settings, &mut stdout).await?,
        },
    }

    Ok(())
}
