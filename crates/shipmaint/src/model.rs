//! Record types for shipmaint.
//!
//! This module defines the five kinds of record held in the store: users,
//! ships, components, maintenance jobs and notifications. Field and enum
//! spellings follow the persisted document exactly (camelCase keys, display
//! strings such as `"In Progress"` for enum values) so that a document
//! exported by one version can be imported by another.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Full access.
    Admin,
    /// Manages components and jobs.
    Inspector,
    /// Works jobs.
    Engineer,
}

impl Role {
    /// Every role.
    pub const ALL: [Role; 3] = [Role::Admin, Role::Inspector, Role::Engineer];

    /// Display name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Inspector => "Inspector",
            Self::Engineer => "Engineer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A user account.
///
/// Passwords are stored in plain text; the seed accounts are demo
/// credentials and the document is local to one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: String,
    /// Access role.
    pub role: Role,
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
}

/// Operational status of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipStatus {
    /// In service.
    Active,
    /// Alongside for maintenance.
    #[serde(rename = "Under Maintenance")]
    UnderMaintenance,
    /// Laid up.
    #[serde(rename = "Out of Service")]
    OutOfService,
}

impl ShipStatus {
    /// Display name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::UnderMaintenance => "Under Maintenance",
            Self::OutOfService => "Out of Service",
        }
    }
}

impl fmt::Display for ShipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A ship in the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    /// Unique identifier.
    pub id: String,
    /// Ship name.
    pub name: String,
    /// Seven-digit IMO number.
    pub imo: String,
    /// Flag state.
    pub flag: String,
    /// Operational status.
    pub status: ShipStatus,
}

/// A ship that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShip {
    /// Ship name.
    pub name: String,
    /// Seven-digit IMO number.
    pub imo: String,
    /// Flag state.
    pub flag: String,
    /// Operational status.
    pub status: ShipStatus,
}

impl NewShip {
    /// Attach an id, producing a stored record.
    #[must_use]
    pub fn with_id(self, id: String) -> Ship {
        Ship {
            id,
            name: self.name,
            imo: self.imo,
            flag: self.flag,
            status: self.status,
        }
    }
}

impl From<&Ship> for NewShip {
    fn from(ship: &Ship) -> Self {
        Self {
            name: ship.name.clone(),
            imo: ship.imo.clone(),
            flag: ship.flag.clone(),
            status: ship.status,
        }
    }
}

/// Equipment installed on a ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Unique identifier.
    pub id: String,
    /// Owning ship.
    pub ship_id: String,
    /// Component name.
    pub name: String,
    /// Manufacturer serial number.
    pub serial_number: String,
    /// Date the component was installed.
    pub install_date: NaiveDate,
    /// Date of the most recent completed maintenance.
    pub last_maintenance_date: NaiveDate,
}

/// A component that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComponent {
    /// Owning ship.
    pub ship_id: String,
    /// Component name.
    pub name: String,
    /// Manufacturer serial number.
    pub serial_number: String,
    /// Date the component was installed.
    pub install_date: NaiveDate,
    /// Date of the most recent completed maintenance.
    pub last_maintenance_date: NaiveDate,
}

impl NewComponent {
    /// Attach an id, producing a stored record.
    #[must_use]
    pub fn with_id(self, id: String) -> Component {
        Component {
            id,
            ship_id: self.ship_id,
            name: self.name,
            serial_number: self.serial_number,
            install_date: self.install_date,
            last_maintenance_date: self.last_maintenance_date,
        }
    }
}

impl From<&Component> for NewComponent {
    fn from(component: &Component) -> Self {
        Self {
            ship_id: component.ship_id.clone(),
            name: component.name.clone(),
            serial_number: component.serial_number.clone(),
            install_date: component.install_date,
            last_maintenance_date: component.last_maintenance_date,
        }
    }
}

/// Kind of maintenance work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobType {
    /// Look, don't touch.
    Inspection,
    /// Fix in place.
    Repair,
    /// Swap the part.
    Replacement,
    /// Strip down and rebuild.
    Overhaul,
}

impl JobType {
    /// Display name of the job type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inspection => "Inspection",
            Self::Repair => "Repair",
            Self::Replacement => "Replacement",
            Self::Overhaul => "Overhaul",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Urgency of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JobPriority {
    /// Whenever convenient.
    Low,
    /// Normal scheduling.
    Medium,
    /// Schedule soon.
    High,
    /// Schedule now.
    Critical,
}

impl JobPriority {
    /// Display name of the priority.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for JobPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Progress of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    /// Not started.
    Open,
    /// Being worked.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Done.
    Completed,
    /// Abandoned.
    Cancelled,
}

impl JobStatus {
    /// Display name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A scheduled maintenance job.
///
/// `ship_id` duplicates the owning component's ship so that ship-level
/// listings and cascades do not have to go through components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique identifier.
    pub id: String,
    /// Component being worked on.
    pub component_id: String,
    /// Ship the component is installed on.
    pub ship_id: String,
    /// Kind of work.
    #[serde(rename = "type")]
    pub kind: JobType,
    /// Urgency.
    pub priority: JobPriority,
    /// Progress.
    pub status: JobStatus,
    /// Engineer responsible for the work.
    pub assigned_engineer_id: String,
    /// Day the work is planned for.
    pub scheduled_date: NaiveDate,
    /// Day the work was finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A job that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    /// Component being worked on.
    pub component_id: String,
    /// Ship the component is installed on.
    pub ship_id: String,
    /// Kind of work.
    #[serde(rename = "type")]
    pub kind: JobType,
    /// Urgency.
    pub priority: JobPriority,
    /// Progress.
    pub status: JobStatus,
    /// Engineer responsible for the work.
    pub assigned_engineer_id: String,
    /// Day the work is planned for.
    pub scheduled_date: NaiveDate,
    /// Day the work was finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewJob {
    /// Attach an id, producing a stored record.
    #[must_use]
    pub fn with_id(self, id: String) -> Job {
        Job {
            id,
            component_id: self.component_id,
            ship_id: self.ship_id,
            kind: self.kind,
            priority: self.priority,
            status: self.status,
            assigned_engineer_id: self.assigned_engineer_id,
            scheduled_date: self.scheduled_date,
            completed_date: self.completed_date,
            notes: self.notes,
        }
    }
}

impl From<&Job> for NewJob {
    fn from(job: &Job) -> Self {
        Self {
            component_id: job.component_id.clone(),
            ship_id: job.ship_id.clone(),
            kind: job.kind,
            priority: job.priority,
            status: job.status,
            assigned_engineer_id: job.assigned_engineer_id.clone(),
            scheduled_date: job.scheduled_date,
            completed_date: job.completed_date,
            notes: job.notes.clone(),
        }
    }
}

/// What happened to the job a notification talks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationType {
    /// A job was scheduled.
    JobCreated,
    /// A job changed status.
    JobUpdated,
    /// A job was completed.
    JobCompleted,
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JobCreated => write!(f, "JobCreated"),
            Self::JobUpdated => write!(f, "JobUpdated"),
            Self::JobCompleted => write!(f, "JobCompleted"),
        }
    }
}

/// An entry in the notification feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique identifier.
    pub id: String,
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Human readable text.
    pub message: String,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Whether the feed entry has been seen.
    pub read: bool,
    /// Job the notification refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}
