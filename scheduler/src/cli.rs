// Command-line definitions for the scheduler binary

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scheduler")]
#[command(about = "Inspect and follow recurring schedules")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration directory (default.toml, local.toml)
    #[arg(short, long, default_value = "config", global = true)]
    pub config: PathBuf,

    /// Schedules file, overriding the configured one
    #[arg(short, long, global = true)]
    pub schedules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub(crate) enum Commands {
    /// Describe every schedule and list its next executions (default)
    Preview {
        /// Executions listed per schedule
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Reference instant (RFC 3339); defaults to now
        #[arg(long)]
        after: Option<DateTime<Utc>>,
    },

    /// Log each schedule as it becomes due until interrupted
    Watch,

    /// List the time zone ids accepted by custom schedules
    Zones,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_preview_arguments() {
        let cli = Cli::parse_from([
            "scheduler",
            "preview",
            "-n",
            "3",
            "--after",
            "2024-01-10T01:00:00Z",
        ]);
        assert_eq!(
            cli.command,
            Some(Commands::Preview {
                count: Some(3),
                after: Some(Utc.with_ymd_and_hms(2024, 1, 10, 1, 0, 0).unwrap()),
            })
        );
        assert_eq!(cli.config, PathBuf::from("config"));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["scheduler", "watch", "--schedules", "jobs.json"]);
        assert_eq!(cli.command, Some(Commands::Watch));
        assert_eq!(cli.schedules, Some(PathBuf::from("jobs.json")));
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["scheduler"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_rejects_bad_instant() {
        assert!(Cli::try_parse_from(["scheduler", "preview", "--after", "tomorrow"]).is_err());
    }
}
