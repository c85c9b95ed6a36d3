//! `shipmaint` - Record keeping for ship maintenance
//!
//! This library owns the single persisted document holding users, ships,
//! installed components, maintenance jobs and notifications, and enforces
//! the cascades, permissions and derived notifications that keep it
//! consistent.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod query;
pub mod store;
pub mod validation;

pub use auth::Permission;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use logging::init_logging;
pub use model::{
    Component, Job, JobPriority, JobStatus, JobType, NewComponent, NewJob, NewShip, Notification,
    NotificationType, Role, Ship, ShipStatus, User,
};
pub use store::{Document, ImportOutcome, RecordStore, StoreStatus};
