//! The persisted record document.
//!
//! One [`Document`] holds every collection. The store loads it whole, applies
//! one logical operation to it and writes it back whole; the helpers here are
//! the in-memory half of that cycle, including the cascade rules for deletes.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{
    Component, Job, JobPriority, JobStatus, JobType, Notification, NotificationType, Role, Ship,
    ShipStatus, User,
};

use super::migrations::CURRENT_VERSION;

/// All records, as persisted under the storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document schema version.
    pub schema_version: u32,
    /// User accounts.
    pub users: Vec<User>,
    /// Ships.
    pub ships: Vec<Ship>,
    /// Components, each owned by a ship.
    pub components: Vec<Component>,
    /// Maintenance jobs, each owned by a component.
    pub jobs: Vec<Job>,
    /// Notification feed, oldest first.
    pub notifications: Vec<Notification>,
}

/// What a cascading delete removed besides the record itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cascade {
    /// Components removed.
    pub components: usize,
    /// Jobs removed.
    pub jobs: usize,
}

/// Generate a fresh record id with a collection prefix, e.g. `s3f2c…`.
#[must_use]
pub fn new_id(prefix: char) -> String {
    format!("{prefix}{}", Uuid::new_v4().simple())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl Document {
    /// The first-run document: demo accounts, two ships, two components, one
    /// job and its creation notice.
    #[must_use]
    pub fn seed(now: DateTime<Utc>) -> Self {
        let user = |id: &str, role, email: &str, password: &str| User {
            id: id.to_string(),
            role,
            email: email.to_string(),
            password: password.to_string(),
        };

        Self {
            schema_version: CURRENT_VERSION,
            users: vec![
                user("1", Role::Admin, "admin@entnt.com", "Admin@2024"),
                user("2", Role::Inspector, "inspector@entnt.com", "Inspect@2024"),
                user("3", Role::Engineer, "engineer@entnt.com", "Engineer@2024"),
            ],
            ships: vec![
                Ship {
                    id: "s1".to_string(),
                    name: "Ever Given".to_string(),
                    imo: "9811000".to_string(),
                    flag: "Panama".to_string(),
                    status: ShipStatus::Active,
                },
                Ship {
                    id: "s2".to_string(),
                    name: "Maersk Alabama".to_string(),
                    imo: "9164263".to_string(),
                    flag: "USA".to_string(),
                    status: ShipStatus::UnderMaintenance,
                },
            ],
            components: vec![
                Component {
                    id: "c1".to_string(),
                    ship_id: "s1".to_string(),
                    name: "Main Engine".to_string(),
                    serial_number: "ME-1234".to_string(),
                    install_date: date(2020, 1, 10),
                    last_maintenance_date: date(2024, 3, 12),
                },
                Component {
                    id: "c2".to_string(),
                    ship_id: "s2".to_string(),
                    name: "Radar".to_string(),
                    serial_number: "RAD-5678".to_string(),
                    install_date: date(2021, 7, 18),
                    last_maintenance_date: date(2023, 12, 1),
                },
            ],
            jobs: vec![Job {
                id: "j1".to_string(),
                component_id: "c1".to_string(),
                ship_id: "s1".to_string(),
                kind: JobType::Inspection,
                priority: JobPriority::High,
                status: JobStatus::Open,
                assigned_engineer_id: "3".to_string(),
                scheduled_date: date(2025, 5, 5),
                completed_date: None,
                notes: None,
            }],
            notifications: vec![Notification {
                id: "n1".to_string(),
                kind: NotificationType::JobCreated,
                message: "New inspection job created for Main Engine on Ever Given".to_string(),
                timestamp: now,
                read: false,
                job_id: Some("j1".to_string()),
            }],
        }
    }

    /// Look up a user.
    #[must_use]
    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Look up a ship.
    #[must_use]
    pub fn ship(&self, id: &str) -> Option<&Ship> {
        self.ships.iter().find(|s| s.id == id)
    }

    /// Look up a component.
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Look up a component for mutation.
    pub fn component_mut(&mut self, id: &str) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.id == id)
    }

    /// Look up a job.
    #[must_use]
    pub fn job(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Append a notification and return its id.
    pub fn push_notification(
        &mut self,
        kind: NotificationType,
        message: String,
        timestamp: DateTime<Utc>,
        job_id: Option<String>,
    ) -> String {
        let id = new_id('n');
        self.notifications.push(Notification {
            id: id.clone(),
            kind,
            message,
            timestamp,
            read: false,
            job_id,
        });
        id
    }

    /// Remove a ship together with its components and their jobs.
    ///
    /// Returns `None` when no ship has this id; nothing is touched then.
    pub fn remove_ship(&mut self, id: &str) -> Option<Cascade> {
        let before = self.ships.len();
        self.ships.retain(|s| s.id != id);
        if self.ships.len() == before {
            return None;
        }

        let components = self.components.len();
        self.components.retain(|c| c.ship_id != id);
        let jobs = self.jobs.len();
        self.jobs.retain(|j| j.ship_id != id);

        Some(Cascade {
            components: components - self.components.len(),
            jobs: jobs - self.jobs.len(),
        })
    }

    /// Remove a component together with its jobs.
    ///
    /// Other components and jobs of the same ship are left alone.
    pub fn remove_component(&mut self, id: &str) -> Option<Cascade> {
        let before = self.components.len();
        self.components.retain(|c| c.id != id);
        if self.components.len() == before {
            return None;
        }

        let jobs = self.jobs.len();
        self.jobs.retain(|j| j.component_id != id);

        Some(Cascade {
            components: 0,
            jobs: jobs - self.jobs.len(),
        })
    }

    /// Remove a job. Notifications that mention it are kept.
    pub fn remove_job(&mut self, id: &str) -> bool {
        let before = self.jobs.len();
        self.jobs.retain(|j| j.id != id);
        self.jobs.len() != before
    }

    /// Remove a notification.
    pub fn remove_notification(&mut self, id: &str) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    /// Number of unread notifications.
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Consistency problems in the document, one line each.
    ///
    /// An empty list means ids are unique within each collection, every
    /// component points at an existing ship, and every job points at an
    /// existing component on the ship it claims and at a user with the
    /// engineer role.
    #[must_use]
    pub fn integrity_problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        duplicate_ids(&mut problems, "user", self.users.iter().map(|u| u.id.as_str()));
        duplicate_ids(&mut problems, "ship", self.ships.iter().map(|s| s.id.as_str()));
        duplicate_ids(
            &mut problems,
            "component",
            self.components.iter().map(|c| c.id.as_str()),
        );
        duplicate_ids(&mut problems, "job", self.jobs.iter().map(|j| j.id.as_str()));
        duplicate_ids(
            &mut problems,
            "notification",
            self.notifications.iter().map(|n| n.id.as_str()),
        );

        for component in &self.components {
            if self.ship(&component.ship_id).is_none() {
                problems.push(format!(
                    "component {} references missing ship {}",
                    component.id, component.ship_id
                ));
            }
        }

        for job in &self.jobs {
            match self.component(&job.component_id) {
                None => problems.push(format!(
                    "job {} references missing component {}",
                    job.id, job.component_id
                )),
                Some(component) if component.ship_id != job.ship_id => problems.push(format!(
                    "job {} is on ship {} but component {} is on ship {}",
                    job.id, job.ship_id, component.id, component.ship_id
                )),
                Some(_) => {}
            }
            match self.user(&job.assigned_engineer_id) {
                None => problems.push(format!(
                    "job {} is assigned to missing user {}",
                    job.id, job.assigned_engineer_id
                )),
                Some(user) if user.role != Role::Engineer => problems.push(format!(
                    "job {} is assigned to {} who is not an engineer",
                    job.id, user.id
                )),
                Some(_) => {}
            }
        }

        problems
    }

    /// BLAKE3 hash of the compact serialization, as lowercase hex.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    pub fn fingerprint(&self) -> serde_json::Result<String> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

/// Report every id seen more than once in one collection.
fn duplicate_ids<'a>(
    problems: &mut Vec<String>,
    entity: &str,
    ids: impl Iterator<Item = &'a str>,
) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for id in ids {
        if !seen.insert(id) && reported.insert(id) {
            problems.push(format!("{entity} id {id} is used more than once"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn seeded() -> Document {
        Document::seed(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    fn add_component(doc: &mut Document, id: &str, ship_id: &str) {
        doc.components.push(Component {
            id: id.to_string(),
            ship_id: ship_id.to_string(),
            name: format!("Part {id}"),
            serial_number: format!("SN-{id}"),
            install_date: date(2022, 1, 1),
            last_maintenance_date: date(2022, 6, 1),
        });
    }

    fn add_job(doc: &mut Document, id: &str, component_id: &str, ship_id: &str) {
        let mut job = doc.jobs[0].clone();
        job.id = id.to_string();
        job.component_id = component_id.to_string();
        job.ship_id = ship_id.to_string();
        doc.jobs.push(job);
    }

    #[test]
    fn test_seed_contents() {
        let doc = seeded();
        assert_eq!(doc.schema_version, CURRENT_VERSION);
        assert_eq!(doc.users.len(), 3);
        assert_eq!(doc.ships.len(), 2);
        assert_eq!(doc.components.len(), 2);
        assert_eq!(doc.jobs.len(), 1);
        assert_eq!(doc.notifications.len(), 1);
        assert_eq!(doc.unread_count(), 1);
        assert!(doc.integrity_problems().is_empty());
    }

    #[test]
    fn test_new_id_is_prefixed_and_unique() {
        let a = new_id('s');
        let b = new_id('s');
        assert!(a.starts_with('s'));
        assert_eq!(a.len(), 33);
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_ship_cascades_only_its_children() {
        let mut doc = seeded();
        add_component(&mut doc, "c3", "s1");
        add_job(&mut doc, "j2", "c3", "s1");
        add_job(&mut doc, "j3", "c2", "s2");

        let cascade = doc.remove_ship("s1").unwrap();
        assert_eq!(
            cascade,
            Cascade {
                components: 2,
                jobs: 2
            }
        );

        assert!(doc.ship("s1").is_none());
        assert!(doc.components.iter().all(|c| c.ship_id != "s1"));
        assert!(doc.jobs.iter().all(|j| j.ship_id != "s1"));
        assert!(doc.ship("s2").is_some());
        assert!(doc.component("c2").is_some());
        assert!(doc.job("j3").is_some());
    }

    #[test]
    fn test_remove_component_keeps_sibling_jobs() {
        let mut doc = seeded();
        add_component(&mut doc, "c3", "s1");
        add_job(&mut doc, "j2", "c3", "s1");

        let cascade = doc.remove_component("c1").unwrap();
        assert_eq!(cascade.jobs, 1);
        assert!(doc.job("j1").is_none());
        assert!(doc.job("j2").is_some());
        assert!(doc.ship("s1").is_some());
        assert!(doc.component("c3").is_some());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut doc = seeded();
        let before = doc.clone();
        assert!(doc.remove_ship("s404").is_none());
        assert!(doc.remove_component("c404").is_none());
        assert!(!doc.remove_job("j404"));
        assert!(!doc.remove_notification("n404"));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_remove_job_keeps_notifications() {
        let mut doc = seeded();
        assert!(doc.remove_job("j1"));
        assert_eq!(doc.notifications.len(), 1);
    }

    #[test]
    fn test_integrity_problems_detects_mismatched_ship() {
        let mut doc = seeded();
        doc.jobs[0].ship_id = "s2".to_string();
        add_component(&mut doc, "c9", "s404");

        let problems = doc.integrity_problems();
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("missing ship s404")));
        assert!(problems.iter().any(|p| p.contains("job j1")));
    }

    #[test]
    fn test_integrity_problems_detects_duplicate_ids() {
        let mut doc = seeded();
        let mut twin = doc.ships[1].clone();
        twin.id = "s1".to_string();
        doc.ships.push(twin);
        doc.users.push(doc.users[0].clone());
        doc.users.push(doc.users[0].clone());

        let problems = doc.integrity_problems();
        assert_eq!(problems.len(), 2);
        assert!(problems.contains(&"ship id s1 is used more than once".to_string()));
        assert!(problems.contains(&"user id 1 is used more than once".to_string()));
    }

    #[test]
    fn test_integrity_problems_checks_assigned_engineer() {
        let mut doc = seeded();
        add_job(&mut doc, "j2", "c2", "s2");
        doc.jobs[0].assigned_engineer_id = "99".to_string();
        doc.jobs[1].assigned_engineer_id = "2".to_string();

        let problems = doc.integrity_problems();
        assert_eq!(problems.len(), 2);
        assert!(problems.iter().any(|p| p.contains("missing user 99")));
        assert!(problems.iter().any(|p| p.contains("job j2") && p.contains("not an engineer")));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let doc = seeded();
        let same = doc.clone();
        assert_eq!(doc.fingerprint().unwrap(), same.fingerprint().unwrap());

        let mut changed = doc.clone();
        changed.ships[0].name = "Ever Given II".to_string();
        assert_ne!(doc.fingerprint().unwrap(), changed.fingerprint().unwrap());
    }

    #[test]
    fn test_push_notification_starts_unread() {
        let mut doc = seeded();
        doc.notifications.clear();
        let id = doc.push_notification(
            NotificationType::JobUpdated,
            "hello".to_string(),
            Utc::now(),
            Some("j1".to_string()),
        );
        assert!(id.starts_with('n'));
        assert_eq!(doc.unread_count(), 1);
    }

    #[test]
    fn test_round_trip_preserves_records() {
        let doc = seeded();
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
