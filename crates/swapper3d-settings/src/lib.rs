//! Swapper3D Settings Crate
//!
//! Handles panel configuration: where the print server lives, which plugin
//! identifier to listen for, and how diagnostics are logged.

pub mod config;
pub mod error;

pub use config::{LoggingSettings, PanelConfig, PluginSettings, ServerSettings};
pub use error::{SettingsError, SettingsResult};
