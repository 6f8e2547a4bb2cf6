//! # kpwgen-core
//!
//! Core of Kpwgen, a deterministic password generator:
//! - Input validation and platform/account pairing
//! - Batch generation over a pluggable derivation primitive (HMAC-SHA256 built in)
//! - Session history with CSV/TXT export
//! - Expiring persistence of non-secret parameters
//! - Clipboard copy with fallback

pub mod clipboard;
pub mod derive;
pub mod error;
pub mod export;
pub mod generator;
pub mod history;
pub mod input;
pub mod session;
pub mod settings;
pub mod storage;
pub mod strength;

pub use clipboard::{Clipboard, ClipboardBackend, ClipboardError};
pub use derive::{normalize_platform, Derivation, DerivationInput, HmacDerivation, MasterSecret};
pub use error::{DerivationError, KpwgenError, Result, ValidationError};
pub use export::{filename, to_csv, to_txt, write_export, ExportFormat};
pub use generator::{GenerationRequest, GenerationResult, Generator};
pub use history::{HistoryEntry, HistoryStore};
pub use input::{has_count_mismatch, validate, ValidatedInput};
pub use session::GeneratorSession;
pub use settings::{AdvancedParams, ReadOutcome, SettingsStore, StoredAdvancedRecord, TtlChoice};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use strength::{analyze, StrengthLevel, StrengthReport};
