use std::env;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use octofilament_status::commands::FilamentCommands;
use octofilament_status::{FilamentError, OctoPrintClient, PluginSettings, StatusPoller};

#[tokio::main]
async fn main() -> Result<(), FilamentError> {
    init_tracing();
    let settings = PluginSettings::load().await;

    let client = OctoPrintClient::new(&settings)?;
    info!(base_url = %client.base_url(), "Using printer server");

    let commands = || FilamentCommands::new(client.clone(), settings.load_unload_temperature);
    match env::args().nth(1).as_deref() {
        Some("load") => commands().load().await,
        Some("unload") => commands().unload().await,
        Some("resume-retract") => commands().resume_retract(&settings).await,
        Some("pause-script") => commands().run_script(&settings.post_pause_gcode1).await,
        Some("long-pause-script") => commands().run_script(&settings.post_pause_gcode2).await,
        Some(other) => Err(FilamentError::Config(format!(
            "unknown command `{other}`, expected one of `load`, `unload`, \
             `resume-retract`, `pause-script`, `long-pause-script`"
        ))),
        None => monitor(client.clone(), &settings).await,
    }
}

async fn monitor(client: OctoPrintClient, settings: &PluginSettings) -> Result<(), FilamentError> {
    let mut poller = StatusPoller::with_debug_logs(Arc::new(client), settings.enable_debug_logs);
    let mut updates = poller.subscribe();
    poller.start(settings.check_interval)?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                let presentation = snapshot.presentation();
                info!(
                    status = %snapshot.status,
                    label = %snapshot.label,
                    icon = presentation.icon.css_class(),
                    color = presentation.color.name(),
                    "Filament indicator updated"
                );
            }
            signal = &mut shutdown => {
                if let Err(err) = signal {
                    warn!(error = ?err, "Failed to listen for shutdown signal");
                }
                break;
            }
        }
    }

    poller.stop();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
