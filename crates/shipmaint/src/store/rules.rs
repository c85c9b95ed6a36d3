//! Derived effects of job mutations.
//!
//! After a job is added or replaced, the store offers a [`JobEvent`] to each
//! [`Rule`] in order, inside the same locked read-modify-write cycle. Rules
//! write notifications and touch related records; they never fail, and a rule
//! whose related records cannot be found does nothing.

use std::fmt::Debug;

use tracing::debug;

use crate::clock::Clock;
use crate::model::{Job, JobStatus, NotificationType};

use super::document::Document;

/// A job mutation that has just been applied to the document.
#[derive(Debug, Clone, Copy)]
pub enum JobEvent<'a> {
    /// A new job was appended.
    Created {
        /// The stored job.
        job: &'a Job,
    },
    /// An existing job was replaced.
    Updated {
        /// The job as it was before the update.
        previous: &'a Job,
        /// The job as it is now.
        job: &'a Job,
    },
}

impl<'a> JobEvent<'a> {
    /// The job after the mutation.
    #[must_use]
    pub fn job(&self) -> &'a Job {
        match *self {
            Self::Created { job } | Self::Updated { job, .. } => job,
        }
    }

    /// The new status, if this update changed it.
    #[must_use]
    pub fn status_change(&self) -> Option<JobStatus> {
        match self {
            Self::Updated { previous, job } if previous.status != job.status => Some(job.status),
            _ => None,
        }
    }
}

/// A derived effect applied after a job mutation.
pub trait Rule: Send + Sync + Debug {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// React to `event` by editing `doc`.
    fn apply(&self, event: &JobEvent<'_>, doc: &mut Document, clock: &dyn Clock);
}

/// The rules every store runs, in order.
#[must_use]
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(NotifyJobCreated),
        Box::new(NotifyStatusChange),
        Box::new(StampMaintenanceDate),
    ]
}

/// Run `rules` over `event`.
pub fn apply_all(
    rules: &[Box<dyn Rule>],
    event: &JobEvent<'_>,
    doc: &mut Document,
    clock: &dyn Clock,
) {
    for rule in rules {
        debug!("Applying rule {} to job {}", rule.name(), event.job().id);
        rule.apply(event, doc, clock);
    }
}

/// Component and ship names for a job, if both resolve.
fn names(doc: &Document, job: &Job) -> Option<(String, String)> {
    let component = doc.component(&job.component_id)?;
    let ship = doc.ship(&job.ship_id)?;
    Some((component.name.clone(), ship.name.clone()))
}

/// Post a `JobCreated` notice for every new job.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyJobCreated;

impl Rule for NotifyJobCreated {
    fn name(&self) -> &'static str {
        "notify-job-created"
    }

    fn apply(&self, event: &JobEvent<'_>, doc: &mut Document, clock: &dyn Clock) {
        let JobEvent::Created { job } = event else {
            return;
        };
        let Some((component, ship)) = names(doc, job) else {
            return;
        };

        let message = format!(
            "New {} job created for {component} on {ship}",
            job.kind.as_str().to_lowercase()
        );
        doc.push_notification(
            NotificationType::JobCreated,
            message,
            clock.now(),
            Some(job.id.clone()),
        );
    }
}

/// Post a `JobUpdated` or `JobCompleted` notice when a job's status changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotifyStatusChange;

impl Rule for NotifyStatusChange {
    fn name(&self) -> &'static str {
        "notify-status-change"
    }

    fn apply(&self, event: &JobEvent<'_>, doc: &mut Document, clock: &dyn Clock) {
        let Some(status) = event.status_change() else {
            return;
        };
        let job = event.job();
        let Some((component, ship)) = names(doc, job) else {
            return;
        };

        let (kind, message) = if status == JobStatus::Completed {
            (
                NotificationType::JobCompleted,
                format!("{} job for {component} on {ship} has been completed", job.kind),
            )
        } else {
            (
                NotificationType::JobUpdated,
                format!(
                    "{} job for {component} on {ship} status updated to {status}",
                    job.kind
                ),
            )
        };
        doc.push_notification(kind, message, clock.now(), Some(job.id.clone()));
    }
}

/// Set the component's last maintenance date to today when its job completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StampMaintenanceDate;

impl Rule for StampMaintenanceDate {
    fn name(&self) -> &'static str {
        "stamp-maintenance-date"
    }

    fn apply(&self, event: &JobEvent<'_>, doc: &mut Document, clock: &dyn Clock) {
        if event.status_change() != Some(JobStatus::Completed) {
            return;
        }
        let job = event.job();
        let today = clock.today();
        if let Some(component) = doc.component_mut(&job.component_id) {
            debug!(
                "Component {} last maintained {} -> {}",
                component.id, component.last_maintenance_date, today
            );
            component.last_maintenance_date = today;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap())
    }

    fn doc() -> Document {
        let mut doc = Document::seed(clock().now());
        doc.notifications.clear();
        doc
    }

    fn with_status(job: &Job, status: JobStatus) -> Job {
        let mut next = job.clone();
        next.status = status;
        next
    }

    #[test]
    fn test_created_rule_message() {
        let mut doc = doc();
        let job = doc.jobs[0].clone();
        NotifyJobCreated.apply(&JobEvent::Created { job: &job }, &mut doc, &clock());

        assert_eq!(doc.notifications.len(), 1);
        let notice = &doc.notifications[0];
        assert_eq!(notice.kind, NotificationType::JobCreated);
        assert_eq!(
            notice.message,
            "New inspection job created for Main Engine on Ever Given"
        );
        assert_eq!(notice.job_id.as_deref(), Some("j1"));
        assert_eq!(notice.timestamp, clock().now());
        assert!(!notice.read);
    }

    #[test]
    fn test_created_rule_ignores_updates() {
        let mut doc = doc();
        let job = doc.jobs[0].clone();
        let next = with_status(&job, JobStatus::InProgress);
        NotifyJobCreated.apply(
            &JobEvent::Updated {
                previous: &job,
                job: &next,
            },
            &mut doc,
            &clock(),
        );
        assert!(doc.notifications.is_empty());
    }

    #[test]
    fn test_created_rule_skips_unresolved_component() {
        let mut doc = doc();
        let mut job = doc.jobs[0].clone();
        job.component_id = "c404".to_string();
        NotifyJobCreated.apply(&JobEvent::Created { job: &job }, &mut doc, &clock());
        assert!(doc.notifications.is_empty());
    }

    #[test]
    fn test_status_change_to_in_progress() {
        let mut doc = doc();
        let job = doc.jobs[0].clone();
        let next = with_status(&job, JobStatus::InProgress);
        NotifyStatusChange.apply(
            &JobEvent::Updated {
                previous: &job,
                job: &next,
            },
            &mut doc,
            &clock(),
        );

        assert_eq!(doc.notifications.len(), 1);
        assert_eq!(doc.notifications[0].kind, NotificationType::JobUpdated);
        assert_eq!(
            doc.notifications[0].message,
            "Inspection job for Main Engine on Ever Given status updated to In Progress"
        );
    }

    #[test]
    fn test_status_change_to_completed() {
        let mut doc = doc();
        let job = doc.jobs[0].clone();
        let next = with_status(&job, JobStatus::Completed);
        NotifyStatusChange.apply(
            &JobEvent::Updated {
                previous: &job,
                job: &next,
            },
            &mut doc,
            &clock(),
        );

        assert_eq!(doc.notifications.len(), 1);
        assert_eq!(doc.notifications[0].kind, NotificationType::JobCompleted);
        assert_eq!(
            doc.notifications[0].message,
            "Inspection job for Main Engine on Ever Given has been completed"
        );
    }

    #[test]
    fn test_unchanged_status_is_silent() {
        let mut doc = doc();
        let job = doc.jobs[0].clone();
        let mut next = job.clone();
        next.notes = Some("rescheduled".to_string());
        let event = JobEvent::Updated {
            previous: &job,
            job: &next,
        };
        apply_all(&default_rules(), &event, &mut doc, &clock());

        assert!(doc.notifications.is_empty());
        assert_eq!(
            doc.component("c1").unwrap().last_maintenance_date,
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
        );
    }

    #[test]
    fn test_stamp_only_on_completion() {
        let mut doc = doc();
        let job = doc.jobs[0].clone();

        let cancelled = with_status(&job, JobStatus::Cancelled);
        StampMaintenanceDate.apply(
            &JobEvent::Updated {
                previous: &job,
                job: &cancelled,
            },
            &mut doc,
            &clock(),
        );
        assert_eq!(
            doc.component("c1").unwrap().last_maintenance_date,
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
        );

        let completed = with_status(&job, JobStatus::Completed);
        StampMaintenanceDate.apply(
            &JobEvent::Updated {
                previous: &job,
                job: &completed,
            },
            &mut doc,
            &clock(),
        );
        assert_eq!(
            doc.component("c1").unwrap().last_maintenance_date,
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
        assert_eq!(
            doc.component("c2").unwrap().last_maintenance_date,
            NaiveDate::from_ymd_opt(2023, 12, 1).unwrap()
        );
    }

    #[test]
    fn test_created_completed_job_does_not_stamp() {
        let mut doc = doc();
        let job = with_status(&doc.jobs[0], JobStatus::Completed);
        apply_all(
            &default_rules(),
            &JobEvent::Created { job: &job },
            &mut doc,
            &clock(),
        );
        assert_eq!(doc.notifications.len(), 1);
        assert_eq!(
            doc.component("c1").unwrap().last_maintenance_date,
            NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()
        );
    }
}
