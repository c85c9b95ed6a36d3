//! Record store for shipmaint.
//!
//! [`RecordStore`] is the only owner of the persisted document. Every call
//! takes the store lock, loads the whole document from the backend, applies
//! one logical operation (including cascades and derived notifications) and
//! writes the whole document back before releasing the lock. Values handed
//! out are owned copies; re-fetch after a write instead of holding on to
//! them.

pub mod backend;
pub mod document;
pub mod migrations;
pub mod rules;
pub mod schema;

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{BackendKind, Config, DEFAULT_STORAGE_KEY};
use crate::error::{Error, ErrorKind, Result, ValidationErrors};
use crate::model::{
    Component, Job, NewComponent, NewJob, NewShip, Notification, Role, Ship, User,
};
use crate::query::{self, CalendarMonth, DashboardStats};
use crate::validation::{validate_component, validate_job, validate_ship};

pub use backend::{DocumentBackend, MemoryBackend, SqliteBackend};
pub use document::{new_id, Cascade, Document};
pub use rules::{default_rules, JobEvent, Rule};

/// Builder for a [`RecordStore`].
#[derive(Debug)]
pub struct StoreBuilder {
    backend: Box<dyn DocumentBackend>,
    storage_key: String,
    quota: Option<usize>,
    clock: Box<dyn Clock>,
    rules: Vec<Box<dyn Rule>>,
}

impl StoreBuilder {
    /// Key the document is stored under.
    #[must_use]
    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Largest serialized document accepted, or `None` for no limit.
    #[must_use]
    pub fn quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// Clock for timestamps and maintenance dates.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the derived-effect rules.
    #[must_use]
    pub fn rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.rules = rules;
        self
    }

    /// Open the store, writing the seed document on first run and upgrading
    /// an older document in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written, or if the
    /// stored document is corrupt.
    pub fn open(self) -> Result<RecordStore> {
        let store = RecordStore {
            backend: Mutex::new(self.backend),
            storage_key: self.storage_key,
            quota: self.quota,
            clock: self.clock,
            rules: self.rules,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Build the store without reading the stored document.
    ///
    /// Used to repair a store whose document no longer decodes: reads fail
    /// with [`Error::CorruptStore`] until [`RecordStore::reset`] or
    /// [`RecordStore::import`] writes a good document.
    #[must_use]
    pub fn open_for_recovery(self) -> RecordStore {
        warn!(
            "Opening document '{}' for recovery without reading it",
            self.storage_key
        );
        RecordStore {
            backend: Mutex::new(self.backend),
            storage_key: self.storage_key,
            quota: self.quota,
            clock: self.clock,
            rules: self.rules,
        }
    }
}

/// Outcome of [`RecordStore::import`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The stored document was replaced.
    Replaced,
    /// The imported document was identical to the stored one.
    Unchanged,
}

/// Summary of the stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStatus {
    /// Backend description.
    pub backend: String,
    /// Key the document is stored under.
    pub storage_key: String,
    /// Document schema version.
    pub schema_version: u32,
    /// Serialized size in bytes.
    pub document_bytes: usize,
    /// Configured quota in bytes, if any.
    pub quota_bytes: Option<usize>,
    /// BLAKE3 fingerprint of the document.
    pub fingerprint: String,
    /// Number of users.
    pub users: usize,
    /// Number of ships.
    pub ships: usize,
    /// Number of components.
    pub components: usize,
    /// Number of jobs.
    pub jobs: usize,
    /// Number of notifications.
    pub notifications: usize,
    /// Number of unread notifications.
    pub unread_notifications: usize,
}

/// The record store.
#[derive(Debug)]
pub struct RecordStore {
    backend: Mutex<Box<dyn DocumentBackend>>,
    storage_key: String,
    quota: Option<usize>,
    clock: Box<dyn Clock>,
    rules: Vec<Box<dyn Rule>>,
}

type Guard<'a> = MutexGuard<'a, Box<dyn DocumentBackend>>;

impl RecordStore {
    /// Start building a store over `backend` with default settings.
    #[must_use]
    pub fn builder(backend: impl DocumentBackend + 'static) -> StoreBuilder {
        StoreBuilder {
            backend: Box::new(backend),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            quota: None,
            clock: Box::new(SystemClock),
            rules: default_rules(),
        }
    }

    /// A builder for the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened.
    pub fn configured(config: &Config) -> Result<StoreBuilder> {
        let builder = match config.storage.backend {
            BackendKind::Sqlite => Self::builder(SqliteBackend::open(config.database_path())?),
            BackendKind::Memory => Self::builder(MemoryBackend::new()),
        };
        Ok(builder
            .storage_key(config.storage.storage_key.clone())
            .quota(config.quota()))
    }

    /// Open the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be opened or the stored
    /// document is corrupt.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::configured(config)?.open()
    }

    /// The store's clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    fn lock(&self) -> Result<Guard<'_>> {
        self.backend
            .lock()
            .map_err(|_| Error::internal("record store lock poisoned"))
    }

    fn initialize(&self) -> Result<()> {
        let mut backend = self.lock()?;
        match backend.read(&self.storage_key)? {
            None => {
                info!(
                    "No document under '{}', writing seed data",
                    self.storage_key
                );
                self.save(&mut backend, &Document::seed(self.clock.now()))
            }
            Some(raw) => {
                let (doc, upgraded) = decode(&raw)?;
                if upgraded {
                    self.save(&mut backend, &doc)?;
                }
                debug!(
                    "Loaded document '{}' ({} bytes)",
                    self.storage_key,
                    raw.len()
                );
                Ok(())
            }
        }
    }

    fn load(&self, backend: &Guard<'_>) -> Result<Document> {
        match backend.read(&self.storage_key)? {
            Some(raw) => decode(&raw).map(|(doc, _)| doc),
            None => {
                warn!(
                    "Document '{}' disappeared, using seed data",
                    self.storage_key
                );
                Ok(Document::seed(self.clock.now()))
            }
        }
    }

    fn save(&self, backend: &mut Guard<'_>, doc: &Document) -> Result<()> {
        let raw = serde_json::to_string(doc)?;
        if let Some(quota) = self.quota {
            if raw.len() > quota {
                return Err(Error::QuotaExceeded {
                    size: raw.len(),
                    quota,
                });
            }
        }
        backend.write(&self.storage_key, &raw)
    }

    /// Run `f` over a freshly loaded document.
    fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> Result<T> {
        let backend = self.lock()?;
        let doc = self.load(&backend)?;
        Ok(f(&doc))
    }

    /// Load, apply `f`, and save, all under the lock. Nothing is written if
    /// `f` fails.
    fn write<T>(&self, op: &'static str, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        self.write_if_changed(op, |doc| f(doc).map(|value| (value, true)))
    }

    /// Like [`Self::write`], but `f` also reports whether it changed the
    /// document. Unchanged documents are not saved.
    fn write_if_changed<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Document) -> Result<(T, bool)>,
    ) -> Result<T> {
        let mut backend = self.lock()?;
        let mut doc = self.load(&backend)?;
        let result = f(&mut doc).and_then(|(value, changed)| {
            if changed {
                self.save(&mut backend, &doc)?;
            } else {
                debug!("{} changed nothing", op);
            }
            Ok(value)
        });
        match &result {
            Ok(_) => debug!("{} committed", op),
            Err(e) => warn!("{} refused: {}", op, e),
        }
        result
    }

    /// A copy of the whole document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn snapshot(&self) -> Result<Document> {
        self.read(Clone::clone)
    }

    // === Users ===

    /// All users.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn users(&self) -> Result<Vec<User>> {
        self.read(|doc| doc.users.clone())
    }

    /// Users with the engineer role.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn engineers(&self) -> Result<Vec<User>> {
        self.read(|doc| {
            doc.users
                .iter()
                .filter(|u| u.role == Role::Engineer)
                .cloned()
                .collect()
        })
    }

    /// Look up a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn user(&self, id: &str) -> Result<Option<User>> {
        self.read(|doc| doc.user(id).cloned())
    }

    /// The user with these credentials, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>> {
        self.read(|doc| crate::auth::find_user(&doc.users, email, password).cloned())
    }

    // === Ships ===

    /// All ships, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn ships(&self) -> Result<Vec<Ship>> {
        self.read(|doc| doc.ships.clone())
    }

    /// Look up a ship.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn ship(&self, id: &str) -> Result<Option<Ship>> {
        self.read(|doc| doc.ship(id).cloned())
    }

    /// Validate and store a new ship.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad fields, or a storage error.
    pub fn add_ship(&self, ship: NewShip) -> Result<Ship> {
        validate_ship(&ship)?;
        self.write("add ship", |doc| {
            let ship = ship.with_id(new_id('s'));
            info!("Adding ship {} ({})", ship.id, ship.name);
            doc.ships.push(ship.clone());
            Ok(ship)
        })
    }

    /// Replace a stored ship.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no ship has this id, or a validation error.
    pub fn update_ship(&self, ship: Ship) -> Result<Ship> {
        validate_ship(&NewShip::from(&ship))?;
        self.write("update ship", |doc| {
            let slot = doc
                .ships
                .iter_mut()
                .find(|s| s.id == ship.id)
                .ok_or_else(|| Error::not_found("ship", &ship.id))?;
            *slot = ship.clone();
            Ok(ship)
        })
    }

    /// Delete a ship with its components and jobs.
    ///
    /// Returns `false` (and changes nothing) if no ship has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or saved.
    pub fn delete_ship(&self, id: &str) -> Result<bool> {
        self.write_if_changed("delete ship", |doc| {
            let Some(cascade) = doc.remove_ship(id) else {
                return Ok((false, false));
            };
            info!(
                "Deleted ship {} with {} components and {} jobs",
                id, cascade.components, cascade.jobs
            );
            Ok((true, true))
        })
    }

    // === Components ===

    /// All components, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn components(&self) -> Result<Vec<Component>> {
        self.read(|doc| doc.components.clone())
    }

    /// Components installed on a ship.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn components_for_ship(&self, ship_id: &str) -> Result<Vec<Component>> {
        self.read(|doc| {
            doc.components
                .iter()
                .filter(|c| c.ship_id == ship_id)
                .cloned()
                .collect()
        })
    }

    /// Look up a component.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn component(&self, id: &str) -> Result<Option<Component>> {
        self.read(|doc| doc.component(id).cloned())
    }

    /// Validate and store a new component.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad fields or an unknown ship.
    pub fn add_component(&self, component: NewComponent) -> Result<Component> {
        validate_component(&component)?;
        self.write("add component", |doc| {
            check_ship_exists(doc, &component.ship_id)?;
            let component = component.with_id(new_id('c'));
            info!(
                "Adding component {} ({}) to ship {}",
                component.id, component.name, component.ship_id
            );
            doc.components.push(component.clone());
            Ok(component)
        })
    }

    /// Replace a stored component.
    ///
    /// Moving a component to another ship moves its jobs with it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no component has this id, or a validation error.
    pub fn update_component(&self, component: Component) -> Result<Component> {
        validate_component(&NewComponent::from(&component))?;
        self.write("update component", |doc| {
            check_ship_exists(doc, &component.ship_id)?;
            let slot = doc
                .component_mut(&component.id)
                .ok_or_else(|| Error::not_found("component", &component.id))?;
            let moved_from = (slot.ship_id != component.ship_id).then(|| slot.ship_id.clone());
            *slot = component.clone();

            if let Some(from) = moved_from {
                let mut moved = 0;
                for job in doc.jobs.iter_mut().filter(|j| j.component_id == component.id) {
                    job.ship_id.clone_from(&component.ship_id);
                    moved += 1;
                }
                info!(
                    "Moved component {} from ship {} to {} with {} jobs",
                    component.id, from, component.ship_id, moved
                );
            }
            Ok(component)
        })
    }

    /// Delete a component with its jobs.
    ///
    /// Returns `false` (and changes nothing) if no component has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or saved.
    pub fn delete_component(&self, id: &str) -> Result<bool> {
        self.write_if_changed("delete component", |doc| {
            let Some(cascade) = doc.remove_component(id) else {
                return Ok((false, false));
            };
            info!("Deleted component {} with {} jobs", id, cascade.jobs);
            Ok((true, true))
        })
    }

    // === Jobs ===

    /// All jobs, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn jobs(&self) -> Result<Vec<Job>> {
        self.read(|doc| doc.jobs.clone())
    }

    /// Jobs on a ship.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn jobs_for_ship(&self, ship_id: &str) -> Result<Vec<Job>> {
        self.read(|doc| {
            doc.jobs
                .iter()
                .filter(|j| j.ship_id == ship_id)
                .cloned()
                .collect()
        })
    }

    /// Jobs on a component.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn jobs_for_component(&self, component_id: &str) -> Result<Vec<Job>> {
        self.read(|doc| {
            doc.jobs
                .iter()
                .filter(|j| j.component_id == component_id)
                .cloned()
                .collect()
        })
    }

    /// Jobs scheduled on a date.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn jobs_on(&self, date: NaiveDate) -> Result<Vec<Job>> {
        self.read(|doc| query::jobs_on(&doc.jobs, date))
    }

    /// Look up a job.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn job(&self, id: &str) -> Result<Option<Job>> {
        self.read(|doc| doc.job(id).cloned())
    }

    /// Validate and store a new job, then post its creation notice.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad fields, or when the component,
    /// ship and engineer do not resolve or do not belong together.
    pub fn add_job(&self, job: NewJob) -> Result<Job> {
        validate_job(&job)?;
        self.write("add job", |doc| {
            check_job_refs(doc, &job.component_id, &job.ship_id, &job.assigned_engineer_id)?;
            let job = job.with_id(new_id('j'));
            info!("Adding {} job {} on component {}", job.kind, job.id, job.component_id);
            doc.jobs.push(job.clone());
            rules::apply_all(
                &self.rules,
                &JobEvent::Created { job: &job },
                doc,
                self.clock.as_ref(),
            );
            Ok(job)
        })
    }

    /// Replace a stored job and apply the status-change rules.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no job has this id, or a validation error.
    pub fn update_job(&self, job: Job) -> Result<Job> {
        validate_job(&NewJob::from(&job))?;
        self.write("update job", |doc| {
            check_job_refs(doc, &job.component_id, &job.ship_id, &job.assigned_engineer_id)?;
            let slot = doc
                .jobs
                .iter_mut()
                .find(|j| j.id == job.id)
                .ok_or_else(|| Error::not_found("job", &job.id))?;
            let previous = std::mem::replace(slot, job.clone());
            if previous.status != job.status {
                info!(
                    "Job {} status {} -> {}",
                    job.id, previous.status, job.status
                );
            }
            rules::apply_all(
                &self.rules,
                &JobEvent::Updated {
                    previous: &previous,
                    job: &job,
                },
                doc,
                self.clock.as_ref(),
            );
            Ok(job)
        })
    }

    /// Delete a job. Returns `false` if no job has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or saved.
    pub fn delete_job(&self, id: &str) -> Result<bool> {
        self.write_if_changed("delete job", |doc| {
            let removed = doc.remove_job(id);
            Ok((removed, removed))
        })
    }

    // === Notifications ===

    /// The notification feed, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        self.read(|doc| doc.notifications.clone())
    }

    /// Number of unread notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn unread_count(&self) -> Result<usize> {
        self.read(Document::unread_count)
    }

    /// Mark one notification read. Returns `false` if no notification has
    /// this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or saved.
    pub fn mark_notification_read(&self, id: &str) -> Result<bool> {
        self.write_if_changed("mark notification read", |doc| {
            let Some(notification) = doc.notifications.iter_mut().find(|n| n.id == id) else {
                return Ok((false, false));
            };
            let was_unread = !notification.read;
            notification.read = true;
            Ok((true, was_unread))
        })
    }

    /// Mark every notification read. Returns how many were unread.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or saved.
    pub fn mark_all_notifications_read(&self) -> Result<usize> {
        self.write_if_changed("mark all notifications read", |doc| {
            let unread = doc.unread_count();
            for notification in &mut doc.notifications {
                notification.read = true;
            }
            Ok((unread, unread > 0))
        })
    }

    /// Delete a notification. Returns `false` if no notification has this id.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded or saved.
    pub fn delete_notification(&self, id: &str) -> Result<bool> {
        self.write_if_changed("delete notification", |doc| {
            let removed = doc.remove_notification(id);
            Ok((removed, removed))
        })
    }

    // === Reports ===

    /// Dashboard statistics as of the store clock's today.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn dashboard(&self, overdue_after_days: u32) -> Result<DashboardStats> {
        let today = self.clock.today();
        self.read(|doc| query::dashboard(doc, today, overdue_after_days))
    }

    /// The job calendar for a month.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an impossible month, or an error if the
    /// document cannot be loaded.
    pub fn calendar(&self, year: i32, month: u32) -> Result<CalendarMonth> {
        self.read(|doc| query::calendar_month(&doc.jobs, year, month))?
    }

    // === Whole document ===

    /// The stored document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn export(&self) -> Result<String> {
        let doc = self.snapshot()?;
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Replace the stored document with `json`.
    ///
    /// Unversioned documents are upgraded first. The document must be
    /// consistent (see [`Document::integrity_problems`]). A stored document
    /// that no longer decodes is replaced without comparison.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CorruptStore`] if `json` is not a consistent
    /// document, or a storage error.
    pub fn import(&self, json: &str) -> Result<ImportOutcome> {
        let (incoming, _) = decode(json)?;
        let problems = incoming.integrity_problems();
        if !problems.is_empty() {
            return Err(Error::corrupt(format!(
                "imported document is inconsistent: {}",
                problems.join("; ")
            )));
        }

        let mut backend = self.lock()?;
        match self.load(&backend) {
            Ok(current) => {
                if current.fingerprint()? == incoming.fingerprint()? {
                    info!("Imported document matches stored document");
                    return Ok(ImportOutcome::Unchanged);
                }
            }
            Err(e) if e.kind() == ErrorKind::CorruptStore => {
                warn!("Replacing corrupt document '{}': {}", self.storage_key, e);
            }
            Err(e) => return Err(e),
        }
        self.save(&mut backend, &incoming)?;
        info!(
            "Imported document with {} ships, {} components, {} jobs",
            incoming.ships.len(),
            incoming.components.len(),
            incoming.jobs.len()
        );
        Ok(ImportOutcome::Replaced)
    }

    /// Replace the stored document with the seed document. The stored
    /// document is not read, so this also repairs a corrupt store.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be saved.
    pub fn reset(&self) -> Result<()> {
        let mut backend = self.lock()?;
        self.save(&mut backend, &Document::seed(self.clock.now()))?;
        info!("Reset document '{}' to seed data", self.storage_key);
        Ok(())
    }

    /// Summary of the stored document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be loaded.
    pub fn status(&self) -> Result<StoreStatus> {
        let backend = self.lock()?;
        let doc = self.load(&backend)?;
        Ok(StoreStatus {
            backend: backend.describe(),
            storage_key: self.storage_key.clone(),
            schema_version: doc.schema_version,
            document_bytes: serde_json::to_string(&doc)?.len(),
            quota_bytes: self.quota,
            fingerprint: doc.fingerprint()?,
            users: doc.users.len(),
            ships: doc.ships.len(),
            components: doc.components.len(),
            jobs: doc.jobs.len(),
            notifications: doc.notifications.len(),
            unread_notifications: doc.unread_count(),
        })
    }
}

/// Parse and upgrade a stored document. The flag is true if it was upgraded.
fn decode(raw: &str) -> Result<(Document, bool)> {
    let mut value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| Error::corrupt(format!("invalid JSON: {e}")))?;
    let upgraded = migrations::upgrade(&mut value)?;
    let doc = serde_json::from_value(value).map_err(|e| Error::corrupt(e.to_string()))?;
    Ok((doc, upgraded))
}

fn check_ship_exists(doc: &Document, ship_id: &str) -> Result<()> {
    if doc.ship(ship_id).is_none() {
        return Err(Error::invalid(
            "shipId",
            format!("Ship {ship_id} does not exist"),
        ));
    }
    Ok(())
}

fn check_job_refs(
    doc: &Document,
    component_id: &str,
    ship_id: &str,
    engineer_id: &str,
) -> Result<()> {
    let mut errors = ValidationErrors::default();

    let ship = doc.ship(ship_id);
    if ship.is_none() {
        errors.add("shipId", format!("Ship {ship_id} does not exist"));
    }
    match doc.component(component_id) {
        None => errors.add(
            "componentId",
            format!("Component {component_id} does not exist"),
        ),
        Some(component) if ship.is_some() && component.ship_id != ship_id => errors.add(
            "componentId",
            format!("Component {component_id} is not installed on ship {ship_id}"),
        ),
        Some(_) => {}
    }
    match doc.user(engineer_id) {
        None => errors.add(
            "assignedEngineerId",
            format!("User {engineer_id} does not exist"),
        ),
        Some(user) if user.role != Role::Engineer => errors.add(
            "assignedEngineerId",
            format!("User {engineer_id} is not an engineer"),
        ),
        Some(_) => {}
    }

    errors.into_result()
}
