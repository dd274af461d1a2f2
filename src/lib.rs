//! Filament sensor status indicator for a printer server plugin.
//!
//! [`status::StatusPoller`] polls the plugin status endpoint and projects each
//! result into a [`status::Presentation`] that a host view can bind to.

pub mod commands;
pub mod config;
pub mod octoprint_client;
pub mod status;
pub mod types;

pub use config::{PluginSettings, TriggerState};
pub use octoprint_client::OctoPrintClient;
pub use status::{FilamentStatus, Presentation, StatusPoller, StatusSnapshot};
pub use types::FilamentError;
