// Scheduler binary entry point

mod catalog;
mod cli;
mod watch;

use anyhow::{anyhow, Result};
use catalog::Catalog;
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use recurrence::config::Settings;
use recurrence::telemetry::init_logging;
use recurrence::timezone::available_time_zones;
use recurrence::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use watch::Watcher;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load_from_path(&cli.config)?;
    if let Some(path) = cli.schedules {
        settings.scheduler.schedules_file = path;
    }
    settings.validate().map_err(|e| anyhow!(e))?;

    init_logging(
        &settings.observability.log_level,
        settings.observability.json_logs,
    )?;

    info!(
        config_dir = %cli.config.display(),
        schedules_file = %settings.scheduler.schedules_file.display(),
        "Configuration loaded"
    );

    let command = cli.command.unwrap_or(Commands::Preview {
        count: None,
        after: None,
    });

    match command {
        Commands::Zones => {
            for zone in available_time_zones() {
                println!("{}", zone);
            }
            Ok(())
        }
        Commands::Preview { count, after } => {
            let catalog = load_catalog(&settings)?;
            let count = count.unwrap_or(settings.scheduler.preview_count);
            print!("{}", preview(&catalog, after.unwrap_or_else(Utc::now), count));
            Ok(())
        }
        Commands::Watch => {
            let catalog = load_catalog(&settings)?;
            let watcher = Watcher::new(
                catalog,
                Arc::new(SystemClock),
                Duration::from_secs(settings.scheduler.max_sleep_seconds),
            );
            watcher.run().await
        }
    }
}

fn load_catalog(settings: &Settings) -> Result<Catalog> {
    Catalog::load(&settings.scheduler.schedules_file).map_err(|e| {
        error!(error = %e, "Failed to load schedules");
        e
    })
}

/// Description and next `count` executions of every schedule.
fn preview(catalog: &Catalog, after: chrono::DateTime<Utc>, count: usize) -> String {
    let mut out = String::new();
    for (name, frequency) in &catalog.entries {
        out.push_str(&format!("{}\n", name));
        for line in frequency.to_display_string().lines() {
            out.push_str(&format!("  {}\n", line));
        }
        let upcoming: Vec<_> = frequency.upcoming(after).take(count).collect();
        if upcoming.is_empty() {
            out.push_str("  (no upcoming executions)\n");
        }
        for instant in upcoming {
            out.push_str(&format!("  - {}\n", instant.to_rfc3339()));
        }
    }
    out
}
