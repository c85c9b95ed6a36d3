//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::model::{JobPriority, JobStatus, JobType, ShipStatus};

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Ship commands.
#[derive(Debug, Subcommand)]
pub enum ShipCommand {
    /// List ships
    List {
        /// Only ships whose name, IMO number or flag contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one ship with its components
    Show {
        /// Ship id
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Register a ship
    Add {
        /// Ship name
        #[arg(long)]
        name: String,

        /// Seven-digit IMO number
        #[arg(long)]
        imo: String,

        /// Flag state
        #[arg(long)]
        flag: String,

        /// Operating status
        #[arg(long, value_enum, default_value = "active")]
        status: ShipStatusArg,
    },

    /// Change a ship
    Update {
        /// Ship id
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New IMO number
        #[arg(long)]
        imo: Option<String>,

        /// New flag state
        #[arg(long)]
        flag: Option<String>,

        /// New status
        #[arg(long, value_enum)]
        status: Option<ShipStatusArg>,
    },

    /// Delete a ship with its components and jobs
    Delete {
        /// Ship id
        id: String,
    },
}

/// Component commands.
#[derive(Debug, Subcommand)]
pub enum ComponentCommand {
    /// List components
    List {
        /// Only components on this ship
        #[arg(long)]
        ship: Option<String>,

        /// Only components whose name or serial number contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one component
    Show {
        /// Component id
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Install a component on a ship
    Add {
        /// Ship the component is installed on
        #[arg(long)]
        ship: String,

        /// Component name
        #[arg(long)]
        name: String,

        /// Serial number
        #[arg(long)]
        serial: String,

        /// Installation date (YYYY-MM-DD)
        #[arg(long)]
        installed: NaiveDate,

        /// Last maintenance date (YYYY-MM-DD), defaults to the install date
        #[arg(long)]
        last_maintained: Option<NaiveDate>,
    },

    /// Change a component
    Update {
        /// Component id
        id: String,

        /// Move to this ship (its jobs move too)
        #[arg(long)]
        ship: Option<String>,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New serial number
        #[arg(long)]
        serial: Option<String>,

        /// New installation date
        #[arg(long)]
        installed: Option<NaiveDate>,

        /// New last maintenance date
        #[arg(long)]
        last_maintained: Option<NaiveDate>,
    },

    /// Delete a component with its jobs
    Delete {
        /// Component id
        id: String,
    },
}

/// Job commands.
#[derive(Debug, Subcommand)]
pub enum JobCommand {
    /// List jobs
    List {
        /// Only jobs in this status
        #[arg(long, value_enum)]
        status: Option<JobStatusArg>,

        /// Only jobs with this priority
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,

        /// Only jobs on this ship
        #[arg(long)]
        ship: Option<String>,

        /// Only jobs on this component
        #[arg(long)]
        component: Option<String>,

        /// Only jobs assigned to this engineer
        #[arg(long)]
        engineer: Option<String>,

        /// Only jobs mentioning this text
        #[arg(short, long)]
        search: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one job
    Show {
        /// Job id
        id: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Schedule a job
    Add {
        /// Component the work is on
        #[arg(long)]
        component: String,

        /// Ship the component is on, defaults to the component's ship
        #[arg(long)]
        ship: Option<String>,

        /// Kind of work
        #[arg(short = 't', long = "type", value_enum)]
        kind: JobTypeArg,

        /// Priority
        #[arg(short, long, value_enum, default_value = "medium")]
        priority: PriorityArg,

        /// Assigned engineer's user id
        #[arg(long)]
        engineer: String,

        /// Scheduled date (YYYY-MM-DD)
        #[arg(long)]
        scheduled: NaiveDate,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Change a job
    Update {
        /// Job id
        id: String,

        /// New kind of work
        #[arg(short = 't', long = "type", value_enum)]
        kind: Option<JobTypeArg>,

        /// New priority
        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,

        /// New status
        #[arg(short, long, value_enum)]
        status: Option<JobStatusArg>,

        /// Reassign to this engineer
        #[arg(long)]
        engineer: Option<String>,

        /// New scheduled date
        #[arg(long)]
        scheduled: Option<NaiveDate>,

        /// Completion date, defaults to today when completing
        #[arg(long)]
        completed: Option<NaiveDate>,

        /// Replace the notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a job
    Delete {
        /// Job id
        id: String,
    },

    /// List users who can be assigned jobs
    Engineers,

    /// Show the job calendar for a month
    Calendar {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,

        /// Show only the week containing this date
        #[arg(short, long, conflicts_with = "month")]
        week: Option<NaiveDate>,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// List jobs scheduled on a date
    On {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Notification commands.
#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// List notifications, newest first
    List {
        /// Only unread notifications
        #[arg(short, long)]
        unread: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Mark a notification read
    Read {
        /// Notification id
        id: String,
    },

    /// Mark every notification read
    ReadAll,

    /// Delete a notification
    Delete {
        /// Notification id
        id: String,
    },

    /// Print the number of unread notifications
    Count,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Ship status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShipStatusArg {
    /// In service
    Active,
    /// In maintenance
    UnderMaintenance,
    /// Laid up
    OutOfService,
}

impl From<ShipStatusArg> for ShipStatus {
    fn from(arg: ShipStatusArg) -> Self {
        match arg {
            ShipStatusArg::Active => Self::Active,
            ShipStatusArg::UnderMaintenance => Self::UnderMaintenance,
            ShipStatusArg::OutOfService => Self::OutOfService,
        }
    }
}

/// Job type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobTypeArg {
    /// Inspection
    Inspection,
    /// Repair
    Repair,
    /// Replacement
    Replacement,
    /// Overhaul
    Overhaul,
}

impl From<JobTypeArg> for JobType {
    fn from(arg: JobTypeArg) -> Self {
        match arg {
            JobTypeArg::Inspection => Self::Inspection,
            JobTypeArg::Repair => Self::Repair,
            JobTypeArg::Replacement => Self::Replacement,
            JobTypeArg::Overhaul => Self::Overhaul,
        }
    }
}

/// Job priority argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PriorityArg {
    /// Low
    Low,
    /// Medium
    Medium,
    /// High
    High,
    /// Critical
    Critical,
}

impl From<PriorityArg> for JobPriority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Self::Low,
            PriorityArg::Medium => Self::Medium,
            PriorityArg::High => Self::High,
            PriorityArg::Critical => Self::Critical,
        }
    }
}

/// Job status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobStatusArg {
    /// Open
    Open,
    /// In progress
    InProgress,
    /// Completed
    Completed,
    /// Cancelled
    Cancelled,
}

impl From<JobStatusArg> for JobStatus {
    fn from(arg: JobStatusArg) -> Self {
        match arg {
            JobStatusArg::Open => Self::Open,
            JobStatusArg::InProgress => Self::InProgress,
            JobStatusArg::Completed => Self::Completed,
            JobStatusArg::Cancelled => Self::Cancelled,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Formatted table
    #[default]
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ship_status_arg_conversion() {
        assert_eq!(ShipStatus::from(ShipStatusArg::Active), ShipStatus::Active);
        assert_eq!(
            ShipStatus::from(ShipStatusArg::UnderMaintenance),
            ShipStatus::UnderMaintenance
        );
        assert_eq!(
            ShipStatus::from(ShipStatusArg::OutOfService),
            ShipStatus::OutOfService
        );
    }

    #[test]
    fn test_job_arg_conversions() {
        assert_eq!(JobType::from(JobTypeArg::Overhaul), JobType::Overhaul);
        assert_eq!(JobPriority::from(PriorityArg::Critical), JobPriority::Critical);
        assert_eq!(
            JobStatus::from(JobStatusArg::InProgress),
            JobStatus::InProgress
        );
    }

    #[test]
    fn test_value_enum_names() {
        let names: Vec<String> = JobStatusArg::value_variants()
            .iter()
            .filter_map(|v| v.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(names, ["open", "in-progress", "completed", "cancelled"]);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }
}
