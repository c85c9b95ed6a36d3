//! `shipmaint` - CLI for the ship maintenance record store
//!
//! This binary opens the configured record store, logs the user in from
//! `--email`/`--password` and runs one command against the store.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs;
use std::path::Path;

use anyhow::{bail, Context as _};
use chrono::{Datelike, NaiveDate};
use clap::Parser;
use serde::Serialize;

use shipmaint::auth::{self, Permission};
use shipmaint::cli::{
    Cli, Command, ComponentCommand, ConfigCommand, JobCommand, NotificationCommand, OutputFormat,
    ShipCommand,
};
use shipmaint::query::{self, CalendarDay, ComponentFilter, JobFilter, ShipFilter};
use shipmaint::{
    init_logging, Clock as _, Component, Config, Document, Error, ErrorKind, ImportOutcome, Job,
    JobStatus, NewComponent, NewJob, NewShip, RecordStore, Ship, User,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    if let Command::Config(cmd) = &cli.command {
        return handle_config(cli.config.as_deref(), &config, cmd);
    }

    let (store, recovering) = open_store(&config, cli.recovers_store())?;
    let user = match cli.credentials() {
        Some((email, password)) => {
            let found = if recovering {
                // The stored accounts are unreadable; fall back to the seed accounts.
                let seed = Document::seed(store.clock().now());
                auth::find_user(&seed.users, email, password).cloned()
            } else {
                store.authenticate(email, password)?
            };
            match found {
                Some(user) => Some(user),
                None => bail!("invalid email or password"),
            }
        }
        None => None,
    };
    let session = Session {
        store,
        config,
        user,
    };

    match cli.command {
        Command::Init { force } => handle_init(&session, force),
        Command::Status(cmd) => handle_status(&session, cmd.json),
        Command::Ship(cmd) => handle_ship(&session, cmd),
        Command::Component(cmd) => handle_component(&session, cmd),
        Command::Job(cmd) => handle_job(&session, cmd),
        Command::Notification(cmd) => handle_notification(&session, cmd),
        Command::Stats { json } => handle_stats(&session, json),
        Command::Export { output } => {
            session.login()?;
            let json = session.store.export()?;
            match output {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
        Command::Import { file } => {
            session.require_all()?;
            let json = fs::read_to_string(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            match session.store.import(&json)? {
                ImportOutcome::Replaced => println!("Imported {}", file.display()),
                ImportOutcome::Unchanged => println!("Document unchanged"),
            }
            Ok(())
        }
        Command::Whoami => {
            let user = session.login()?;
            println!("{} ({})", user.email, user.role);
            for permission in user.role.permissions() {
                println!("  can {permission}");
            }
            Ok(())
        }
        Command::Config(cmd) => handle_config(cli.config.as_deref(), &session.config, &cmd),
    }
}

/// Open the configured store. When `recovers` is set, a corrupt document does
/// not stop the command; the store is opened for recovery instead and the
/// second value is `true`.
fn open_store(config: &Config, recovers: bool) -> anyhow::Result<(RecordStore, bool)> {
    match RecordStore::from_config(config) {
        Ok(store) => Ok((store, false)),
        Err(e) if recovers && e.kind() == ErrorKind::CorruptStore => {
            eprintln!("warning: {e}; the document will be replaced");
            let store = RecordStore::configured(config)
                .context("failed to open record store")?
                .open_for_recovery();
            Ok((store, true))
        }
        Err(e) => Err(anyhow::Error::new(e).context("failed to open record store")),
    }
}

/// An opened store and the logged-in user, if any.
#[derive(Debug)]
struct Session {
    store: RecordStore,
    config: Config,
    user: Option<User>,
}

impl Session {
    fn login(&self) -> shipmaint::Result<&User> {
        self.user.as_ref().ok_or_else(|| {
            Error::Unauthenticated("pass --email and --password to log in".to_string())
        })
    }

    fn require(&self, permission: Permission) -> shipmaint::Result<()> {
        auth::require(self.user.as_ref(), permission)
    }

    /// Whole-document operations need every permission.
    fn require_all(&self) -> shipmaint::Result<()> {
        Permission::ALL
            .into_iter()
            .try_for_each(|permission| self.require(permission))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn handle_init(session: &Session, force: bool) -> anyhow::Result<()> {
    if force {
        session.require_all()?;
        session.store.reset()?;
        println!("Record store reset to seed data.");
    }
    let status = session.store.status()?;
    println!(
        "Record store ready: {} ({} ships, {} components, {} jobs)",
        status.backend, status.ships, status.components, status.jobs
    );
    Ok(())
}

fn handle_status(session: &Session, json: bool) -> anyhow::Result<()> {
    let status = session.store.status()?;
    if json {
        return print_json(&status);
    }

    println!("shipmaint status");
    println!("----------------");
    println!("Backend:        {}", status.backend);
    println!("Storage key:    {}", status.storage_key);
    println!("Schema version: {}", status.schema_version);
    match status.quota_bytes {
        Some(quota) => println!("Size:           {} / {} bytes", status.document_bytes, quota),
        None => println!("Size:           {} bytes", status.document_bytes),
    }
    println!("Fingerprint:    {}", status.fingerprint);
    println!();
    println!("Users:          {}", status.users);
    println!("Ships:          {}", status.ships);
    println!("Components:     {}", status.components);
    println!("Jobs:           {}", status.jobs);
    println!(
        "Notifications:  {} ({} unread)",
        status.notifications, status.unread_notifications
    );
    Ok(())
}

fn print_ships(ships: &[Ship]) {
    println!("{:<34} {:<24} {:<8} {:<14} STATUS", "ID", "NAME", "IMO", "FLAG");
    for ship in ships {
        println!(
            "{:<34} {:<24} {:<8} {:<14} {}",
            ship.id, ship.name, ship.imo, ship.flag, ship.status
        );
    }
}

fn print_components(components: &[Component]) {
    println!(
        "{:<34} {:<34} {:<20} {:<16} {:<10} LAST MAINTAINED",
        "ID", "SHIP", "NAME", "SERIAL", "INSTALLED"
    );
    for c in components {
        println!(
            "{:<34} {:<34} {:<20} {:<16} {:<10} {}",
            c.id, c.ship_id, c.name, c.serial_number, c.install_date, c.last_maintenance_date
        );
    }
}

fn print_jobs(jobs: &[Job]) {
    println!(
        "{:<34} {:<34} {:<12} {:<9} {:<12} {:<10} ENGINEER",
        "ID", "COMPONENT", "TYPE", "PRIORITY", "STATUS", "SCHEDULED"
    );
    for job in jobs {
        println!(
            "{:<34} {:<34} {:<12} {:<9} {:<12} {:<10} {}",
            job.id,
            job.component_id,
            job.kind,
            job.priority,
            job.status,
            job.scheduled_date,
            job.assigned_engineer_id
        );
    }
}

fn handle_ship(session: &Session, cmd: ShipCommand) -> anyhow::Result<()> {
    let store = &session.store;
    match cmd {
        ShipCommand::List { search, format } => {
            session.login()?;
            let ships = ShipFilter { search }.apply(&store.ships()?);
            match format {
                OutputFormat::Json => print_json(&ships)?,
                OutputFormat::Table => print_ships(&ships),
            }
        }
        ShipCommand::Show { id, format } => {
            session.login()?;
            let ship = store.ship(&id)?.ok_or_else(|| Error::not_found("ship", &id))?;
            let components = store.components_for_ship(&id)?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "ship": ship,
                    "components": components,
                }))?,
                OutputFormat::Table => {
                    println!("{} ({})", ship.name, ship.id);
                    println!("  IMO:    {}", ship.imo);
                    println!("  Flag:   {}", ship.flag);
                    println!("  Status: {}", ship.status);
                    println!();
                    print_components(&components);
                }
            }
        }
        ShipCommand::Add {
            name,
            imo,
            flag,
            status,
        } => {
            session.require(Permission::CreateShip)?;
            let ship = store.add_ship(NewShip {
                name,
                imo,
                flag,
                status: status.into(),
            })?;
            println!("Added ship {} ({})", ship.id, ship.name);
        }
        ShipCommand::Update {
            id,
            name,
            imo,
            flag,
            status,
        } => {
            session.require(Permission::EditShip)?;
            let mut ship = store.ship(&id)?.ok_or_else(|| Error::not_found("ship", &id))?;
            if let Some(name) = name {
                ship.name = name;
            }
            if let Some(imo) = imo {
                ship.imo = imo;
            }
            if let Some(flag) = flag {
                ship.flag = flag;
            }
            if let Some(status) = status {
                ship.status = status.into();
            }
            let ship = store.update_ship(ship)?;
            println!("Updated ship {}", ship.id);
        }
        ShipCommand::Delete { id } => {
            session.require(Permission::DeleteShip)?;
            if store.delete_ship(&id)? {
                println!("Deleted ship {id} with its components and jobs");
            } else {
                println!("No ship with id {id}");
            }
        }
    }
    Ok(())
}

fn handle_component(session: &Session, cmd: ComponentCommand) -> anyhow::Result<()> {
    let store = &session.store;
    match cmd {
        ComponentCommand::List {
            ship,
            search,
            format,
        } => {
            session.login()?;
            let filter = ComponentFilter {
                ship_id: ship,
                search,
            };
            let components = filter.apply(&store.components()?);
            match format {
                OutputFormat::Json => print_json(&components)?,
                OutputFormat::Table => print_components(&components),
            }
        }
        ComponentCommand::Show { id, format } => {
            session.login()?;
            let component = store
                .component(&id)?
                .ok_or_else(|| Error::not_found("component", &id))?;
            let jobs = store.jobs_for_component(&id)?;
            match format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "component": component,
                    "jobs": jobs,
                }))?,
                OutputFormat::Table => {
                    let overdue = query::is_overdue(
                        &component,
                        store.clock().today(),
                        session.config.maintenance.overdue_after_days,
                    );
                    println!("{} ({})", component.name, component.id);
                    println!("  Ship:            {}", component.ship_id);
                    println!("  Serial number:   {}", component.serial_number);
                    println!("  Installed:       {}", component.install_date);
                    println!(
                        "  Last maintained: {}{}",
                        component.last_maintenance_date,
                        if overdue { " (overdue)" } else { "" }
                    );
                    println!();
                    print_jobs(&jobs);
                }
            }
        }
        ComponentCommand::Add {
            ship,
            name,
            serial,
            installed,
            last_maintained,
        } => {
            session.require(Permission::CreateComponent)?;
            let component = store.add_component(NewComponent {
                ship_id: ship,
                name,
                serial_number: serial,
                install_date: installed,
                last_maintenance_date: last_maintained.unwrap_or(installed),
            })?;
            println!(
                "Added component {} ({}) to ship {}",
                component.id, component.name, component.ship_id
            );
        }
        ComponentCommand::Update {
            id,
            ship,
            name,
            serial,
            installed,
            last_maintained,
        } => {
            session.require(Permission::EditComponent)?;
            let mut component = store
                .component(&id)?
                .ok_or_else(|| Error::not_found("component", &id))?;
            if let Some(ship) = ship {
                component.ship_id = ship;
            }
            if let Some(name) = name {
                component.name = name;
            }
            if let Some(serial) = serial {
                component.serial_number = serial;
            }
            if let Some(installed) = installed {
                component.install_date = installed;
            }
            if let Some(last) = last_maintained {
                component.last_maintenance_date = last;
            }
            let component = store.update_component(component)?;
            println!("Updated component {}", component.id);
        }
        ComponentCommand::Delete { id } => {
            session.require(Permission::DeleteComponent)?;
            if store.delete_component(&id)? {
                println!("Deleted component {id} with its jobs");
            } else {
                println!("No component with id {id}");
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_lines)]
fn handle_job(session: &Session, cmd: JobCommand) -> anyhow::Result<()> {
    let store = &session.store;
    match cmd {
        JobCommand::List {
            status,
            priority,
            ship,
            component,
            engineer,
            search,
            format,
        } => {
            session.login()?;
            let filter = JobFilter {
                status: status.map(Into::into),
                priority: priority.map(Into::into),
                ship_id: ship,
                component_id: component,
                engineer_id: engineer,
                search,
            };
            let jobs = filter.apply(&store.snapshot()?);
            match format {
                OutputFormat::Json => print_json(&jobs)?,
                OutputFormat::Table => print_jobs(&jobs),
            }
        }
        JobCommand::Show { id, format } => {
            session.login()?;
            let job = store.job(&id)?.ok_or_else(|| Error::not_found("job", &id))?;
            match format {
                OutputFormat::Json => print_json(&job)?,
                OutputFormat::Table => {
                    println!("{} job {}", job.kind, job.id);
                    println!("  Component: {}", job.component_id);
                    println!("  Ship:      {}", job.ship_id);
                    println!("  Priority:  {}", job.priority);
                    println!("  Status:    {}", job.status);
                    println!("  Engineer:  {}", job.assigned_engineer_id);
                    println!("  Scheduled: {}", job.scheduled_date);
                    if let Some(completed) = job.completed_date {
                        println!("  Completed: {completed}");
                    }
                    if let Some(notes) = &job.notes {
                        println!("  Notes:     {notes}");
                    }
                }
            }
        }
        JobCommand::Add {
            component,
            ship,
            kind,
            priority,
            engineer,
            scheduled,
            notes,
        } => {
            session.require(Permission::CreateJob)?;
            session.require(Permission::AssignJob)?;
            let ship_id = match ship {
                Some(ship) => ship,
                None => store
                    .component(&component)?
                    .map(|c| c.ship_id)
                    .unwrap_or_default(),
            };
            let job = store.add_job(NewJob {
                component_id: component,
                ship_id,
                kind: kind.into(),
                priority: priority.into(),
                status: JobStatus::Open,
                assigned_engineer_id: engineer,
                scheduled_date: scheduled,
                completed_date: None,
                notes,
            })?;
            println!("Scheduled {} job {} for {}", job.kind, job.id, job.scheduled_date);
        }
        JobCommand::Update {
            id,
            kind,
            priority,
            status,
            engineer,
            scheduled,
            completed,
            notes,
        } => {
            session.require(Permission::EditJob)?;
            let mut job = store.job(&id)?.ok_or_else(|| Error::not_found("job", &id))?;
            if let Some(engineer) = engineer {
                if engineer != job.assigned_engineer_id {
                    session.require(Permission::AssignJob)?;
                    job.assigned_engineer_id = engineer;
                }
            }
            if let Some(kind) = kind {
                job.kind = kind.into();
            }
            if let Some(priority) = priority {
                job.priority = priority.into();
            }
            if let Some(scheduled) = scheduled {
                job.scheduled_date = scheduled;
            }
            if let Some(status) = status {
                job.status = status.into();
            }
            if completed.is_some() {
                job.completed_date = completed;
            } else if job.status == JobStatus::Completed && job.completed_date.is_none() {
                job.completed_date = Some(store.clock().today());
            }
            if notes.is_some() {
                job.notes = notes;
            }
            let job = store.update_job(job)?;
            println!("Updated job {} ({})", job.id, job.status);
        }
        JobCommand::Delete { id } => {
            session.require(Permission::DeleteJob)?;
            if store.delete_job(&id)? {
                println!("Deleted job {id}");
            } else {
                println!("No job with id {id}");
            }
        }
        JobCommand::Engineers => {
            session.login()?;
            println!("{:<34} EMAIL", "ID");
            for engineer in store.engineers()? {
                println!("{:<34} {}", engineer.id, engineer.email);
            }
        }
        JobCommand::Calendar { month, week, json } => {
            session.login()?;
            if let Some(date) = week {
                let days = query::week_of(&store.jobs()?, date)?;
                return if json {
                    print_json(&days)
                } else {
                    print_days(&days);
                    Ok(())
                };
            }
            let (year, month) = match month {
                Some(text) => query::parse_month(&text)?,
                None => {
                    let today = store.clock().today();
                    (today.year(), today.month())
                }
            };
            let calendar = store.calendar(year, month)?;
            if json {
                return print_json(&calendar);
            }
            let first = NaiveDate::from_ymd_opt(year, month, 1)
                .context("calendar month out of range")?;
            println!("{:^27}", first.format("%B %Y").to_string());
            println!(" Sun Mon Tue Wed Thu Fri Sat");
            for week in &calendar.weeks {
                let row: String = week
                    .iter()
                    .map(|day| {
                        let mark = if day.jobs.is_empty() { ' ' } else { '*' };
                        if day.in_month {
                            format!(" {:>2}{mark}", day.date.day())
                        } else {
                            "    ".to_string()
                        }
                    })
                    .collect();
                println!("{row}");
            }
            let busy: Vec<CalendarDay> = calendar
                .weeks
                .into_iter()
                .flatten()
                .filter(|day| day.in_month && !day.jobs.is_empty())
                .collect();
            if !busy.is_empty() {
                println!();
                print_days(&busy);
            }
        }
        JobCommand::On { date, format } => {
            session.login()?;
            let jobs = store.jobs_on(date)?;
            match format {
                OutputFormat::Json => print_json(&jobs)?,
                OutputFormat::Table => print_jobs(&jobs),
            }
        }
    }
    Ok(())
}

fn print_days(days: &[CalendarDay]) {
    for day in days {
        println!("{} ({})", day.date, day.date.format("%a"));
        for job in &day.jobs {
            println!(
                "  {} {} {} [{}] {}",
                job.id, job.kind, job.component_id, job.priority, job.status
            );
        }
    }
}

fn handle_notification(session: &Session, cmd: NotificationCommand) -> anyhow::Result<()> {
    session.login()?;
    let store = &session.store;
    match cmd {
        NotificationCommand::List { unread, format } => {
            let mut notifications = store.notifications()?;
            notifications.retain(|n| !unread || !n.read);
            notifications.reverse();
            match format {
                OutputFormat::Json => print_json(&notifications)?,
                OutputFormat::Table => {
                    for n in &notifications {
                        println!(
                            "{} {} {:<13} {}{}",
                            if n.read { ' ' } else { '*' },
                            n.timestamp.format("%Y-%m-%d %H:%M"),
                            n.kind.to_string(),
                            n.message,
                            n.job_id
                                .as_deref()
                                .map(|id| format!(" ({id})"))
                                .unwrap_or_default()
                        );
                    }
                }
            }
        }
        NotificationCommand::Read { id } => {
            if !store.mark_notification_read(&id)? {
                println!("No notification with id {id}");
            }
        }
        NotificationCommand::ReadAll => {
            let marked = store.mark_all_notifications_read()?;
            println!("Marked {marked} notifications read");
        }
        NotificationCommand::Delete { id } => {
            if store.delete_notification(&id)? {
                println!("Deleted notification {id}");
            } else {
                println!("No notification with id {id}");
            }
        }
        NotificationCommand::Count => println!("{}", store.unread_count()?),
    }
    Ok(())
}

fn handle_stats(session: &Session, json: bool) -> anyhow::Result<()> {
    session.require(Permission::ViewReports)?;
    let stats = session
        .store
        .dashboard(session.config.maintenance.overdue_after_days)?;
    if json {
        return print_json(&stats);
    }

    println!("Ships:               {}", stats.ship_count);
    println!("Overdue components:  {}", stats.overdue_components);
    println!("Jobs in progress:    {}", stats.jobs_in_progress);
    println!("Jobs completed:      {}", stats.jobs_completed);
    println!();
    println!(
        "{:<24} {:>5} {:>12} {:>10} {:>10}",
        "SHIP", "OPEN", "IN PROGRESS", "COMPLETED", "CANCELLED"
    );
    for row in &stats.jobs_by_ship {
        println!(
            "{:<24} {:>5} {:>12} {:>10} {:>10}",
            row.ship_name, row.open, row.in_progress, row.completed, row.cancelled
        );
    }
    Ok(())
}

fn handle_config(
    config_path: Option<&Path>,
    config: &Config,
    cmd: &ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Backend:            {:?}", config.storage.backend);
                println!("  Database path:      {}", config.database_path().display());
                println!("  Storage key:        {}", config.storage.storage_key);
                match config.quota() {
                    Some(quota) => println!("  Quota (bytes):      {quota}"),
                    None => println!("  Quota (bytes):      unlimited"),
                }
                println!();
                println!("[Maintenance]");
                println!(
                    "  Overdue after days: {}",
                    config.maintenance.overdue_after_days
                );
            }
        }
        ConfigCommand::Path => {
            let path = config_path.map_or_else(Config::default_config_path, Path::to_path_buf);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .clone()
                .or_else(|| config_path.map(Path::to_path_buf))
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("configuration error: {e}"),
            }
        }
    }
    Ok(())
}
