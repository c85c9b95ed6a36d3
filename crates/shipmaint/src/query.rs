//! Read-side views over a document snapshot.
//!
//! Filters for the list screens, dashboard statistics and the calendar grid.
//! Everything here is a pure function of a [`Document`] (or a slice of jobs)
//! and never touches storage.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Component, Job, JobPriority, JobStatus, Ship};
use crate::store::Document;

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn normalized(search: Option<&String>) -> Option<String> {
    search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
}

/// Ship list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShipFilter {
    /// Case-insensitive substring of name, IMO number or flag.
    pub search: Option<String>,
}

impl ShipFilter {
    /// Whether `ship` passes the filter.
    #[must_use]
    pub fn matches(&self, ship: &Ship) -> bool {
        let Some(term) = normalized(self.search.as_ref()) else {
            return true;
        };
        contains_ci(&ship.name, &term)
            || contains_ci(&ship.imo, &term)
            || contains_ci(&ship.flag, &term)
    }

    /// Keep the ships that pass, in order.
    #[must_use]
    pub fn apply(&self, ships: &[Ship]) -> Vec<Ship> {
        ships.iter().filter(|s| self.matches(s)).cloned().collect()
    }
}

/// Component list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentFilter {
    /// Only components on this ship.
    pub ship_id: Option<String>,
    /// Case-insensitive substring of name or serial number.
    pub search: Option<String>,
}

impl ComponentFilter {
    /// Whether `component` passes the filter.
    #[must_use]
    pub fn matches(&self, component: &Component) -> bool {
        if let Some(ship_id) = &self.ship_id {
            if &component.ship_id != ship_id {
                return false;
            }
        }
        let Some(term) = normalized(self.search.as_ref()) else {
            return true;
        };
        contains_ci(&component.name, &term) || contains_ci(&component.serial_number, &term)
    }

    /// Keep the components that pass, in order.
    #[must_use]
    pub fn apply(&self, components: &[Component]) -> Vec<Component> {
        components
            .iter()
            .filter(|c| self.matches(c))
            .cloned()
            .collect()
    }
}

/// Job list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Only jobs in this status.
    pub status: Option<JobStatus>,
    /// Only jobs with this priority.
    pub priority: Option<JobPriority>,
    /// Only jobs on this ship.
    pub ship_id: Option<String>,
    /// Only jobs on this component.
    pub component_id: Option<String>,
    /// Only jobs assigned to this engineer.
    pub engineer_id: Option<String>,
    /// Case-insensitive substring of the component name, ship name, type,
    /// priority, status, engineer email or scheduled date.
    pub search: Option<String>,
}

impl JobFilter {
    /// Whether `job` passes the filter. `doc` resolves names for searching.
    #[must_use]
    pub fn matches(&self, job: &Job, doc: &Document) -> bool {
        if self.status.is_some_and(|s| s != job.status)
            || self.priority.is_some_and(|p| p != job.priority)
        {
            return false;
        }
        let wrong = |wanted: &Option<String>, actual: &str| {
            wanted.as_deref().is_some_and(|w| w != actual)
        };
        if wrong(&self.ship_id, &job.ship_id)
            || wrong(&self.component_id, &job.component_id)
            || wrong(&self.engineer_id, &job.assigned_engineer_id)
        {
            return false;
        }

        let Some(term) = normalized(self.search.as_ref()) else {
            return true;
        };
        doc.component(&job.component_id)
            .is_some_and(|c| contains_ci(&c.name, &term))
            || doc.ship(&job.ship_id).is_some_and(|s| contains_ci(&s.name, &term))
            || contains_ci(job.kind.as_str(), &term)
            || contains_ci(job.priority.as_str(), &term)
            || contains_ci(job.status.as_str(), &term)
            || doc
                .user(&job.assigned_engineer_id)
                .is_some_and(|u| contains_ci(&u.email, &term))
            || job.scheduled_date.to_string().contains(&term)
    }

    /// Keep the document's jobs that pass, in order.
    #[must_use]
    pub fn apply(&self, doc: &Document) -> Vec<Job> {
        doc.jobs
            .iter()
            .filter(|j| self.matches(j, doc))
            .cloned()
            .collect()
    }
}

/// Whether `component` is due for maintenance as of `today`: at least
/// `overdue_after_days` whole days have passed since it was last maintained.
#[must_use]
pub fn is_overdue(component: &Component, today: NaiveDate, overdue_after_days: u32) -> bool {
    (today - component.last_maintenance_date).num_days() >= i64::from(overdue_after_days)
}

/// Job counts by status for one ship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShipJobCounts {
    /// The ship.
    pub ship_id: String,
    /// Its name.
    pub ship_name: String,
    /// Jobs not started.
    pub open: usize,
    /// Jobs being worked.
    pub in_progress: usize,
    /// Jobs done.
    pub completed: usize,
    /// Jobs abandoned.
    pub cancelled: usize,
}

impl ShipJobCounts {
    /// All jobs on the ship.
    #[must_use]
    pub fn total(&self) -> usize {
        self.open + self.in_progress + self.completed + self.cancelled
    }
}

/// Fleet-wide maintenance indicators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Ships in the fleet.
    pub ship_count: usize,
    /// Components past their maintenance window.
    pub overdue_components: usize,
    /// Jobs being worked.
    pub jobs_in_progress: usize,
    /// Jobs done.
    pub jobs_completed: usize,
    /// Per-ship job breakdown, in ship order.
    pub jobs_by_ship: Vec<ShipJobCounts>,
}

/// Compute dashboard statistics as of `today`.
#[must_use]
pub fn dashboard(doc: &Document, today: NaiveDate, overdue_after_days: u32) -> DashboardStats {
    let count_status =
        |status: JobStatus| doc.jobs.iter().filter(|j| j.status == status).count();

    let jobs_by_ship = doc
        .ships
        .iter()
        .map(|ship| {
            let mut counts = ShipJobCounts {
                ship_id: ship.id.clone(),
                ship_name: ship.name.clone(),
                ..ShipJobCounts::default()
            };
            for job in doc.jobs.iter().filter(|j| j.ship_id == ship.id) {
                match job.status {
                    JobStatus::Open => counts.open += 1,
                    JobStatus::InProgress => counts.in_progress += 1,
                    JobStatus::Completed => counts.completed += 1,
                    JobStatus::Cancelled => counts.cancelled += 1,
                }
            }
            counts
        })
        .collect();

    DashboardStats {
        ship_count: doc.ships.len(),
        overdue_components: doc
            .components
            .iter()
            .filter(|c| is_overdue(c, today, overdue_after_days))
            .count(),
        jobs_in_progress: count_status(JobStatus::InProgress),
        jobs_completed: count_status(JobStatus::Completed),
        jobs_by_ship,
    }
}

/// Jobs scheduled on `date`, in document order.
#[must_use]
pub fn jobs_on(jobs: &[Job], date: NaiveDate) -> Vec<Job> {
    jobs.iter()
        .filter(|j| j.scheduled_date == date)
        .cloned()
        .collect()
}

/// One cell of the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    /// The date.
    pub date: NaiveDate,
    /// False for the padding days before and after the month.
    pub in_month: bool,
    /// Jobs scheduled that day.
    pub jobs: Vec<Job>,
}

/// A month laid out as Sunday-to-Saturday weeks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarMonth {
    /// Year shown.
    pub year: i32,
    /// Month shown, 1-12.
    pub month: u32,
    /// Rows of seven days.
    pub weeks: Vec<Vec<CalendarDay>>,
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::invalid("month", format!("{year}-{month:02} is not a valid month")))
}

fn out_of_range(date: NaiveDate) -> Error {
    Error::invalid("date", format!("the week of {date} is outside the supported calendar"))
}

fn week_start(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_sub_signed(Duration::days(i64::from(date.weekday().num_days_from_sunday())))
        .ok_or_else(|| out_of_range(date))
}

fn week_end(date: NaiveDate) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(i64::from(6 - date.weekday().num_days_from_sunday())))
        .ok_or_else(|| out_of_range(date))
}

/// Dates shown for a month: from the Sunday on or before the 1st through the
/// Saturday on or after the last day. Always a multiple of seven.
///
/// # Errors
///
/// Returns a validation error for an impossible year/month, or one whose
/// padding weeks fall outside the supported date range.
pub fn month_grid(year: i32, month: u32) -> Result<Vec<NaiveDate>> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        first_of_month(year + 1, 1)?
    } else {
        first_of_month(year, month + 1)?
    };
    let last = next.pred_opt().ok_or_else(|| out_of_range(next))?;

    let start = week_start(first)?;
    let end = week_end(last)?;

    Ok(start
        .iter_days()
        .take_while(|d| *d <= end)
        .collect())
}

/// Lay out `jobs` on the calendar for a month.
///
/// # Errors
///
/// Returns a validation error for an impossible year/month.
pub fn calendar_month(jobs: &[Job], year: i32, month: u32) -> Result<CalendarMonth> {
    let days: Vec<CalendarDay> = month_grid(year, month)?
        .into_iter()
        .map(|date| CalendarDay {
            date,
            in_month: date.month() == month && date.year() == year,
            jobs: jobs_on(jobs, date),
        })
        .collect();

    Ok(CalendarMonth {
        year,
        month,
        weeks: days.chunks(7).map(<[CalendarDay]>::to_vec).collect(),
    })
}

/// The Sunday-to-Saturday week containing `date`, with its jobs.
///
/// # Errors
///
/// Returns a validation error if the week runs past the supported date range.
pub fn week_of(jobs: &[Job], date: NaiveDate) -> Result<Vec<CalendarDay>> {
    let end = week_end(date)?;
    Ok(week_start(date)?
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| CalendarDay {
            date: day,
            in_month: day.month() == date.month(),
            jobs: jobs_on(jobs, day),
        })
        .collect())
}

/// Parse a `YYYY-MM` month.
///
/// # Errors
///
/// Returns a validation error if the text is not a valid month.
pub fn parse_month(text: &str) -> Result<(i32, u32)> {
    let bad = || Error::invalid("month", format!("expected YYYY-MM, got `{text}`"));
    let (year, month) = text.trim().split_once('-').ok_or_else(bad)?;
    let year: i32 = year.parse().map_err(|_| bad())?;
    let month: u32 = month.parse().map_err(|_| bad())?;
    first_of_month(year, month)?;
    Ok((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc, Weekday};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seeded() -> Document {
        Document::seed(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_ship_filter_search() {
        let doc = seeded();
        let by_flag = ShipFilter {
            search: Some("panama".to_string()),
        };
        let found = by_flag.apply(&doc.ships);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "s1");

        let by_imo = ShipFilter {
            search: Some("9164".to_string()),
        };
        assert_eq!(by_imo.apply(&doc.ships)[0].id, "s2");

        assert_eq!(ShipFilter::default().apply(&doc.ships).len(), 2);
        let blank = ShipFilter {
            search: Some("   ".to_string()),
        };
        assert_eq!(blank.apply(&doc.ships).len(), 2);
    }

    #[test]
    fn test_component_filter() {
        let doc = seeded();
        let on_s2 = ComponentFilter {
            ship_id: Some("s2".to_string()),
            search: None,
        };
        assert_eq!(on_s2.apply(&doc.components)[0].id, "c2");

        let serial = ComponentFilter {
            ship_id: None,
            search: Some("me-12".to_string()),
        };
        assert_eq!(serial.apply(&doc.components)[0].id, "c1");

        let mismatch = ComponentFilter {
            ship_id: Some("s2".to_string()),
            search: Some("engine".to_string()),
        };
        assert!(mismatch.apply(&doc.components).is_empty());
    }

    #[test]
    fn test_job_filter_fields() {
        let doc = seeded();
        let open = JobFilter {
            status: Some(JobStatus::Open),
            ..JobFilter::default()
        };
        assert_eq!(open.apply(&doc).len(), 1);

        let low = JobFilter {
            priority: Some(JobPriority::Low),
            ..JobFilter::default()
        };
        assert!(low.apply(&doc).is_empty());

        let other_ship = JobFilter {
            ship_id: Some("s2".to_string()),
            ..JobFilter::default()
        };
        assert!(other_ship.apply(&doc).is_empty());
    }

    #[test]
    fn test_job_filter_search_resolves_names() {
        let doc = seeded();
        for term in ["ever given", "MAIN ENGINE", "inspection", "high", "engineer@", "2025-05"] {
            let filter = JobFilter {
                search: Some(term.to_string()),
                ..JobFilter::default()
            };
            assert_eq!(filter.apply(&doc).len(), 1, "term {term}");
        }
        let miss = JobFilter {
            search: Some("radar".to_string()),
            ..JobFilter::default()
        };
        assert!(miss.apply(&doc).is_empty());
    }

    #[test]
    fn test_is_overdue_boundary() {
        let doc = seeded();
        let component = &doc.components[0]; // last maintained 2024-03-12
        let edge = date(2024, 3, 12) + Duration::days(180);
        assert!(is_overdue(component, edge, 180));
        assert!(!is_overdue(component, edge - Duration::days(1), 180));
    }

    #[test]
    fn test_dashboard_counts() {
        let mut doc = seeded();
        let mut done = doc.jobs[0].clone();
        done.id = "j2".to_string();
        done.status = JobStatus::Completed;
        doc.jobs.push(done);

        let stats = dashboard(&doc, date(2024, 6, 1), 180);
        assert_eq!(stats.ship_count, 2);
        // Radar last maintained 2023-12-01, main engine 2024-03-12.
        assert_eq!(stats.overdue_components, 1);
        assert_eq!(stats.jobs_in_progress, 0);
        assert_eq!(stats.jobs_completed, 1);
        assert_eq!(stats.jobs_by_ship.len(), 2);
        assert_eq!(stats.jobs_by_ship[0].open, 1);
        assert_eq!(stats.jobs_by_ship[0].completed, 1);
        assert_eq!(stats.jobs_by_ship[0].total(), 2);
        assert_eq!(stats.jobs_by_ship[1].total(), 0);
    }

    #[test]
    fn test_month_grid_may_2025() {
        // 1 May 2025 is a Thursday; 31 May is a Saturday.
        let grid = month_grid(2025, 5).unwrap();
        assert_eq!(grid.first(), Some(&date(2025, 4, 27)));
        assert_eq!(grid.last(), Some(&date(2025, 5, 31)));
        assert_eq!(grid.len(), 35);
        assert_eq!(grid[0].weekday(), Weekday::Sun);
    }

    #[test]
    fn test_month_grid_december_rolls_year() {
        let grid = month_grid(2024, 12).unwrap();
        assert_eq!(grid.first(), Some(&date(2024, 12, 1)));
        assert_eq!(grid.last(), Some(&date(2025, 1, 4)));
        assert_eq!(grid.len() % 7, 0);
    }

    #[test]
    fn test_month_grid_rejects_bad_month() {
        let err = month_grid(2025, 13).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_calendar_month_places_jobs() {
        let doc = seeded();
        let calendar = calendar_month(&doc.jobs, 2025, 5).unwrap();
        assert_eq!(calendar.weeks.len(), 5);
        assert!(calendar.weeks.iter().all(|w| w.len() == 7));

        let cells: Vec<&CalendarDay> = calendar.weeks.iter().flatten().collect();
        assert!(!cells[0].in_month);
        let may5 = cells.iter().find(|d| d.date == date(2025, 5, 5)).unwrap();
        assert!(may5.in_month);
        assert_eq!(may5.jobs.len(), 1);
        assert_eq!(cells.iter().map(|d| d.jobs.len()).sum::<usize>(), 1);
    }

    #[test]
    fn test_week_of() {
        let doc = seeded();
        let week = week_of(&doc.jobs, date(2025, 5, 7)).unwrap();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, date(2025, 5, 4));
        assert_eq!(week[1].jobs.len(), 1);
    }

    #[test]
    fn test_calendar_at_date_range_edges_is_rejected() {
        let max = NaiveDate::MAX;
        let err = calendar_month(&[], max.year(), max.month()).unwrap_err();
        assert!(err.is_validation());

        let min = NaiveDate::MIN;
        match week_of(&[], min) {
            Ok(week) => assert_eq!(week[0].date, min),
            Err(err) => assert!(err.is_validation()),
        }
        match calendar_month(&[], min.year(), min.month()) {
            Ok(calendar) => assert_eq!(calendar.weeks[0][0].date, min),
            Err(err) => assert!(err.is_validation()),
        }
        match week_of(&[], max) {
            Ok(week) => assert_eq!(max.weekday(), Weekday::Sat, "{week:?}"),
            Err(err) => assert!(err.is_validation()),
        }
    }

    #[test]
    fn test_jobs_on() {
        let doc = seeded();
        assert_eq!(jobs_on(&doc.jobs, date(2025, 5, 5)).len(), 1);
        assert!(jobs_on(&doc.jobs, date(2025, 5, 6)).is_empty());
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-05").unwrap(), (2025, 5));
        assert!(parse_month("2025-00").is_err());
        assert!(parse_month("May 2025").is_err());
    }
}
