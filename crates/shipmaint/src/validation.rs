//! Field validation for records entering the store.
//!
//! These are the same checks the entry forms apply: required fields, the
//! IMO number format and date ordering. Referential checks (does the ship
//! exist?) need the document and live in the store.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, ValidationErrors};
use crate::model::{JobStatus, NewComponent, NewJob, NewShip};

fn imo_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{7}$").expect("IMO pattern is valid"))
}

/// Whether `imo` is a well-formed IMO number (exactly seven digits).
#[must_use]
pub fn is_valid_imo(imo: &str) -> bool {
    imo_pattern().is_match(imo)
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validate a ship.
///
/// # Errors
///
/// Returns a validation error listing every failing field.
pub fn validate_ship(ship: &NewShip) -> Result<()> {
    let mut errors = ValidationErrors::default();

    if blank(&ship.name) {
        errors.add("name", "Ship name is required");
    }
    if blank(&ship.imo) {
        errors.add("imo", "IMO number is required");
    } else if !is_valid_imo(&ship.imo) {
        errors.add("imo", "IMO number must be 7 digits");
    }
    if blank(&ship.flag) {
        errors.add("flag", "Flag is required");
    }

    errors.into_result()
}

/// Validate a component.
///
/// # Errors
///
/// Returns a validation error listing every failing field.
pub fn validate_component(component: &NewComponent) -> Result<()> {
    let mut errors = ValidationErrors::default();

    if blank(&component.ship_id) {
        errors.add("shipId", "Ship is required");
    }
    if blank(&component.name) {
        errors.add("name", "Component name is required");
    }
    if blank(&component.serial_number) {
        errors.add("serialNumber", "Serial number is required");
    }
    if component.last_maintenance_date < component.install_date {
        errors.add(
            "lastMaintenanceDate",
            "Last maintenance date cannot be before installation date",
        );
    }

    errors.into_result()
}

/// Validate a job.
///
/// # Errors
///
/// Returns a validation error listing every failing field.
pub fn validate_job(job: &NewJob) -> Result<()> {
    let mut errors = ValidationErrors::default();

    if blank(&job.ship_id) {
        errors.add("shipId", "Ship is required");
    }
    if blank(&job.component_id) {
        errors.add("componentId", "Component is required");
    }
    if blank(&job.assigned_engineer_id) {
        errors.add("assignedEngineerId", "Assigned engineer is required");
    }
    if job.status == JobStatus::Completed && job.completed_date.is_none() {
        errors.add(
            "completedDate",
            "Completed date is required for completed jobs",
        );
    }

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{JobPriority, JobType, ShipStatus};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ship(imo: &str) -> NewShip {
        NewShip {
            name: "Test".to_string(),
            imo: imo.to_string(),
            flag: "USA".to_string(),
            status: ShipStatus::Active,
        }
    }

    fn job(status: JobStatus, completed: Option<NaiveDate>) -> NewJob {
        NewJob {
            component_id: "c1".to_string(),
            ship_id: "s1".to_string(),
            kind: JobType::Inspection,
            priority: JobPriority::High,
            status,
            assigned_engineer_id: "3".to_string(),
            scheduled_date: date(2025, 5, 5),
            completed_date: completed,
            notes: None,
        }
    }

    #[test]
    fn test_imo_accepts_seven_digits() {
        assert!(is_valid_imo("1234567"));
        assert!(validate_ship(&ship("1234567")).is_ok());
    }

    #[test]
    fn test_imo_rejects_wrong_length() {
        assert!(!is_valid_imo("12345"));
        assert!(!is_valid_imo("12345678"));
        let err = validate_ship(&ship("12345")).unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert!(errors.has("imo"));
        assert_eq!(errors.errors()[0].message, "IMO number must be 7 digits");
    }

    #[test]
    fn test_imo_rejects_letters() {
        assert!(!is_valid_imo("12a4567"));
        assert!(!is_valid_imo(" 1234567"));
    }

    #[test]
    fn test_ship_reports_every_missing_field() {
        let blank_ship = NewShip {
            name: "  ".to_string(),
            imo: String::new(),
            flag: String::new(),
            status: ShipStatus::Active,
        };
        let err = validate_ship(&blank_ship).unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert!(errors.has("name"));
        assert!(errors.has("imo"));
        assert!(errors.has("flag"));
        assert_eq!(errors.errors()[1].message, "IMO number is required");
    }

    #[test]
    fn test_component_date_ordering() {
        let mut component = NewComponent {
            ship_id: "s1".to_string(),
            name: "Main Engine".to_string(),
            serial_number: "ME-1".to_string(),
            install_date: date(2020, 1, 10),
            last_maintenance_date: date(2020, 1, 10),
        };
        assert!(validate_component(&component).is_ok());

        component.last_maintenance_date = date(2019, 12, 31);
        let err = validate_component(&component).unwrap_err();
        assert!(err.validation_errors().unwrap().has("lastMaintenanceDate"));
    }

    #[test]
    fn test_component_requires_ship_and_serial() {
        let component = NewComponent {
            ship_id: String::new(),
            name: "Radar".to_string(),
            serial_number: String::new(),
            install_date: date(2021, 7, 18),
            last_maintenance_date: date(2023, 12, 1),
        };
        let err = validate_component(&component).unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert!(errors.has("shipId"));
        assert!(errors.has("serialNumber"));
        assert!(!errors.has("name"));
    }

    #[test]
    fn test_completed_job_needs_completed_date() {
        assert!(validate_job(&job(JobStatus::Open, None)).is_ok());
        assert!(validate_job(&job(JobStatus::Completed, Some(date(2025, 5, 6)))).is_ok());
        let err = validate_job(&job(JobStatus::Completed, None)).unwrap_err();
        assert!(err.validation_errors().unwrap().has("completedDate"));
    }

    #[test]
    fn test_job_requires_engineer() {
        let mut draft = job(JobStatus::Open, None);
        draft.assigned_engineer_id = String::new();
        let err = validate_job(&draft).unwrap_err();
        assert!(err.validation_errors().unwrap().has("assignedEngineerId"));
    }
}
