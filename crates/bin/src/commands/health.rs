//! Health command: the connectivity indicator.

use std::sync::Arc;

use spamscope::config::ConfigError;
use spamscope::connectivity::{Connectivity, ConnectivityMonitor, probe};
use spamscope::{Settings, format_millis};

use crate::backend::classifier;
use crate::cli::HealthArgs;
use crate::output::{OutputFormat, print_json};

fn report(state: Connectivity, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => println!("{state}"),
        OutputFormat::Json => {
            let now = format_millis(chrono::Utc::now().timestamp_millis());
            print_json(&serde_json::json!({ "state": state, "at": now }))?;
        }
    }
    Ok(())
}

/// Settings with the probe interval taken from the command line.
fn watch_settings(args: &HealthArgs, settings: &Settings) -> Result<Settings, ConfigError> {
    let settings = Settings {
        ping_interval_secs: args.interval,
        ..settings.clone()
    };
    settings.validate()?;
    Ok(settings)
}

/// Run the health command
pub async fn run(
    args: &HealthArgs,
    settings: &Settings,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = watch_settings(args, settings)?;
    let api = classifier(&settings)?;

    if !args.watch {
        let state = probe(&api).await;
        report(state, format)?;
        if !state.is_connected() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let interval = settings.ping_interval();
    let mut monitor = ConnectivityMonitor::spawn(Arc::new(api), interval);
    tracing::info!("Watching {} every {}s", settings.server_url, interval.as_secs());

    loop {
        tokio::select! {
            changed = monitor.changed() => match changed {
                Some(state) => report(state, format)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping");
                monitor.stop();
                break;
            }
        }
    }
    Ok(())
}
