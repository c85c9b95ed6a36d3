//! Command-line interface for shipmaint.
//!
//! This module provides the CLI structure for the `shipmaint` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ComponentCommand, ConfigCommand, JobCommand, JobStatusArg, JobTypeArg, NotificationCommand,
    OutputFormat, PriorityArg, ShipCommand, ShipStatusArg, StatusCommand,
};

use crate::logging::Verbosity;

/// shipmaint - Ship maintenance records
///
/// Keeps the fleet's ships, installed components and maintenance jobs, and
/// posts a notification whenever a job is scheduled or changes status.
#[derive(Debug, Parser)]
#[command(name = "shipmaint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log in as this user
    #[arg(long, global = true, env = "SHIPMAINT_EMAIL")]
    pub email: Option<String>,

    /// Password for --email
    #[arg(long, global = true, env = "SHIPMAINT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the record store, writing the seed data
    Init {
        /// Replace an existing document with the seed data
        #[arg(short, long)]
        force: bool,
    },

    /// Show record store status
    Status(StatusCommand),

    /// Manage ships
    #[command(subcommand)]
    Ship(ShipCommand),

    /// Manage installed components
    #[command(subcommand)]
    Component(ComponentCommand),

    /// Manage maintenance jobs
    #[command(subcommand)]
    Job(JobCommand),

    /// Read the notification feed
    #[command(subcommand)]
    Notification(NotificationCommand),

    /// Show dashboard statistics
    Stats {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Write the whole document as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Replace the whole document from a JSON export
    Import {
        /// Exported document
        file: PathBuf,
    },

    /// Show the logged-in user and their permissions
    Whoami,

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }

    /// Commands that rewrite the whole document, and so may run against a
    /// store whose document no longer decodes.
    #[must_use]
    pub fn recovers_store(&self) -> bool {
        matches!(
            self.command,
            Command::Init { force: true } | Command::Import { .. }
        )
    }

    /// The login credentials, when both were given.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((self.email.as_deref()?, self.password.as_deref()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "shipmaint");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        assert_eq!(parse(&["shipmaint", "status"]).verbosity(), Verbosity::Normal);
        assert_eq!(
            parse(&["shipmaint", "-vv", "status"]).verbosity(),
            Verbosity::Debug
        );
        assert_eq!(
            parse(&["shipmaint", "-v", "-q", "status"]).verbosity(),
            Verbosity::Quiet
        );
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["shipmaint", "-c", "/custom/config.toml", "status"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_credentials() {
        let cli = parse(&[
            "shipmaint",
            "--email",
            "admin@entnt.com",
            "--password",
            "Admin@2024",
            "whoami",
        ]);
        assert_eq!(cli.credentials(), Some(("admin@entnt.com", "Admin@2024")));
        assert!(matches!(cli.command, Command::Whoami));
    }

    #[test]
    fn test_parse_init_force() {
        let cli = parse(&["shipmaint", "init", "--force"]);
        assert!(matches!(cli.command, Command::Init { force: true }));
    }

    #[test]
    fn test_parse_ship_add() {
        let cli = parse(&[
            "shipmaint",
            "ship",
            "add",
            "--name",
            "Nordic Star",
            "--imo",
            "9234567",
            "--flag",
            "Norway",
            "--status",
            "under-maintenance",
        ]);
        match cli.command {
            Command::Ship(ShipCommand::Add { name, status, .. }) => {
                assert_eq!(name, "Nordic Star");
                assert_eq!(status, ShipStatusArg::UnderMaintenance);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_component_add_dates() {
        let cli = parse(&[
            "shipmaint",
            "component",
            "add",
            "--ship",
            "s1",
            "--name",
            "Boiler",
            "--serial",
            "BL-1",
            "--installed",
            "2022-03-04",
        ]);
        match cli.command {
            Command::Component(ComponentCommand::Add {
                installed,
                last_maintained,
                ..
            }) => {
                assert_eq!(installed.to_string(), "2022-03-04");
                assert!(last_maintained.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        let result = Cli::try_parse_from(["shipmaint", "job", "on", "2025-13-01"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_job_update_status() {
        let cli = parse(&["shipmaint", "job", "update", "j1", "--status", "completed"]);
        match cli.command {
            Command::Job(JobCommand::Update { id, status, .. }) => {
                assert_eq!(id, "j1");
                assert_eq!(status, Some(JobStatusArg::Completed));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_job_add_type_flag() {
        let cli = parse(&[
            "shipmaint",
            "job",
            "add",
            "--component",
            "c1",
            "--type",
            "repair",
            "--engineer",
            "3",
            "--scheduled",
            "2025-07-01",
        ]);
        match cli.command {
            Command::Job(JobCommand::Add {
                kind, priority, ship, ..
            }) => {
                assert_eq!(kind, JobTypeArg::Repair);
                assert_eq!(priority, PriorityArg::Medium);
                assert!(ship.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_calendar_month_and_week_conflict() {
        let result = Cli::try_parse_from([
            "shipmaint",
            "job",
            "calendar",
            "--month",
            "2025-05",
            "--week",
            "2025-05-05",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_notification_read_all() {
        let cli = parse(&["shipmaint", "notification", "read-all"]);
        assert!(matches!(
            cli.command,
            Command::Notification(NotificationCommand::ReadAll)
        ));
    }

    #[test]
    fn test_recovers_store() {
        assert!(parse(&["shipmaint", "init", "--force"]).recovers_store());
        assert!(parse(&["shipmaint", "import", "backup.json"]).recovers_store());
        assert!(!parse(&["shipmaint", "init"]).recovers_store());
        assert!(!parse(&["shipmaint", "ship", "list"]).recovers_store());
    }

    #[test]
    fn test_parse_job_engineers() {
        let cli = parse(&["shipmaint", "job", "engineers"]);
        assert!(matches!(cli.command, Command::Job(JobCommand::Engineers)));
    }

    #[test]
    fn test_parse_import() {
        let cli = parse(&["shipmaint", "import", "backup.json"]);
        match cli.command {
            Command::Import { file } => assert_eq!(file, PathBuf::from("backup.json")),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
