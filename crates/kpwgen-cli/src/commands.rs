//! Command implementations

use clap::Args;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use kpwgen_core::{
    analyze, write_export, AdvancedParams, Clipboard, ExportFormat, GeneratorSession,
    HmacDerivation, MasterSecret, ReadOutcome, SettingsStore, TtlChoice,
};

use crate::clipboard::{CommandClipboard, Osc52Clipboard};

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Advanced parameter flags; unset flags keep the saved (or default) value
#[derive(Args, Debug, Clone, Default)]
pub struct ParamOverrides {
    /// Password version; increment to rotate
    #[arg(id = "pw_version", long = "pw-version", value_name = "N")]
    pub version: Option<u32>,

    /// Target password length including prefix and suffix
    #[arg(long, value_name = "N")]
    pub length: Option<usize>,

    #[arg(long)]
    pub prefix: Option<String>,

    #[arg(long)]
    pub suffix: Option<String>,

    /// Use platform names literally (no normalization)
    #[arg(long, conflicts_with = "normalize")]
    pub raw: bool,

    /// Normalize platform names (overrides a saved raw mode)
    #[arg(long)]
    pub normalize: bool,
}

impl ParamOverrides {
    pub fn apply(&self, base: AdvancedParams) -> AdvancedParams {
        let raw_mode = if self.raw {
            true
        } else if self.normalize {
            false
        } else {
            base.raw_mode
        };

        AdvancedParams {
            version: self.version.unwrap_or(base.version),
            length: self.length.unwrap_or(base.length),
            prefix: self.prefix.clone().unwrap_or(base.prefix),
            suffix: self.suffix.clone().unwrap_or(base.suffix),
            raw_mode,
        }
    }
}

/// Options for `generate`
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub platforms: String,
    pub accounts: String,
    pub overrides: ParamOverrides,
    pub export: Vec<ExportFormat>,
    pub out_dir: PathBuf,
    pub copy: bool,
    pub strength: bool,
}

/// Generate passwords, print them, then export and copy as requested
pub async fn generate(
    settings: &SettingsStore,
    secret: MasterSecret,
    options: GenerateOptions,
    out: &mut impl Write,
) -> CommandResult {
    let base = settings.load_params().await?.unwrap_or_default();
    let params = options.overrides.apply(base);

    let clipboard = Clipboard::new(Arc::new(CommandClipboard::new()), Arc::new(Osc52Clipboard));
    let mut session =
        GeneratorSession::new(Arc::new(HmacDerivation::new())).with_clipboard(clipboard);
    session.set_secret(secret).await;
    session.set_platforms(options.platforms).await;
    session.set_accounts(options.accounts).await;
    session.apply_params(params).await;

    if session.mismatch_hint() {
        warn!("Account count does not match platform count");
    }

    let results = session.submit().await?.to_vec();

    for result in &results {
        let label = match &result.account {
            Some(account) => format!("{} ({})", result.platform, account),
            None => result.platform.clone(),
        };
        if options.strength {
            let report = analyze(&result.password);
            writeln!(
                out,
                "{}\t{}\t[{} {}/5]",
                label,
                result.password,
                report.level.as_str(),
                report.score
            )?;
        } else {
            writeln!(out, "{}\t{}", label, result.password)?;
        }
    }

    if options.copy {
        if let Some(first) = results.first() {
            if session.copy(&first.password).await {
                info!("Copied password for {} to clipboard", first.platform);
            } else {
                warn!("Could not copy to clipboard");
            }
        }
    }

    if !options.export.is_empty() {
        let entries = session.history_entries().await;
        for format in &options.export {
            let path = write_export(&options.out_dir, &entries, *format).await?;
            writeln!(out, "Exported {}", path.display())?;
        }
    }

    Ok(())
}

/// Save advanced parameters with an expiry
pub async fn settings_save(
    settings: &SettingsStore,
    ttl: TtlChoice,
    overrides: &ParamOverrides,
    out: &mut impl Write,
) -> CommandResult {
    let base = settings.load_params().await?.unwrap_or_default();
    let record = settings.save(&overrides.apply(base), ttl.duration()).await?;

    match record.expires_at {
        Some(expires_at) => writeln!(
            out,
            "Saved parameters ({}), expiring {}",
            ttl.label(),
            expires_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        )?,
        None => writeln!(out, "Saved parameters (no expiry)")?,
    }
    Ok(())
}

/// Show the saved parameters
pub async fn settings_show(settings: &SettingsStore, out: &mut impl Write) -> CommandResult {
    match settings.read().await? {
        ReadOutcome::Empty => writeln!(out, "No saved parameters")?,
        ReadOutcome::Ok(record) => {
            writeln!(out, "{}", serde_json::to_string_pretty(&record.data)?)?;
            match record.expires_at {
                Some(expires_at) => writeln!(
                    out,
                    "Expires {}",
                    expires_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
                )?,
                None => writeln!(out, "Never expires")?,
            }
        }
        ReadOutcome::Expired(expired_at) => writeln!(
            out,
            "Saved parameters expired {} and were removed",
            expired_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        )?,
        ReadOutcome::Corrupt => writeln!(out, "Saved parameters were unreadable and were removed")?,
    }
    Ok(())
}

/// Remove the saved parameters
pub async fn settings_clear(settings: &SettingsStore, out: &mut impl Write) -> CommandResult {
    settings.clear().await?;
    writeln!(out, "Cleared saved parameters")?;
    Ok(())
}
