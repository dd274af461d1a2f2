use async_trait::async_trait;
use tracing::info;

use crate::config::PluginSettings;
use crate::octoprint_client::{CommandRequest, OctoPrintClient, COMMAND_PATH};
use crate::types::FilamentError;

use super::gcode::{load_sequence, resume_retract_sequence, script_lines, unload_sequence};

/// Host command-dispatch API.
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn send_commands(&self, commands: &[String]) -> Result<(), FilamentError>;
}

#[async_trait]
impl CommandSink for OctoPrintClient {
    async fn send_commands(&self, commands: &[String]) -> Result<(), FilamentError> {
        self.post_json(COMMAND_PATH, &CommandRequest { commands }).await
    }
}

/// User-triggered filament load/unload and configured pause scripts.
pub struct FilamentCommands<S> {
    sink: S,
    temperature: u16,
}

impl<S: CommandSink> FilamentCommands<S> {
    pub fn new(sink: S, temperature: u16) -> Self {
        Self { sink, temperature }
    }

    pub async fn load(&self) -> Result<(), FilamentError> {
        info!(temperature = self.temperature, "Loading filament");
        self.sink.send_commands(&load_sequence(self.temperature)).await
    }

    pub async fn unload(&self) -> Result<(), FilamentError> {
        info!(temperature = self.temperature, "Unloading filament");
        self.sink
            .send_commands(&unload_sequence(self.temperature))
            .await
    }

    /// Send the configured resume retraction. Nothing is sent when it is disabled.
    pub async fn resume_retract(&self, settings: &PluginSettings) -> Result<(), FilamentError> {
        let commands = resume_retract_sequence(
            settings.enable_resume_retract,
            settings.resume_retract_mm,
            settings.resume_retract_speed,
        );
        if commands.is_empty() {
            info!("Resume retraction disabled, nothing to send");
            return Ok(());
        }
        info!(
            distance_mm = settings.resume_retract_mm,
            speed = settings.resume_retract_speed,
            "Retracting before resume"
        );
        self.sink.send_commands(&commands).await
    }

    /// Send a multi-line G-code script, skipping blank lines.
    pub async fn run_script(&self, script: &str) -> Result<(), FilamentError> {
        let commands = script_lines(script);
        if commands.is_empty() {
            info!("Script is empty, nothing to send");
            return Ok(());
        }
        info!(lines = commands.len(), "Sending G-code script");
        self.sink.send_commands(&commands).await
    }
}
