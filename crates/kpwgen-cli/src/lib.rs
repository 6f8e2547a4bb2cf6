//! # kpwgen-cli
//!
//! Command-line front end for Kpwgen. Generates passwords for one or more
//! platforms, exports the session history and manages saved parameters.

pub mod clipboard;
pub mod commands;

pub use clipboard::{CommandClipboard, Osc52Clipboard};
pub use commands::{GenerateOptions, ParamOverrides};
