//! Roles, permissions and login.
//!
//! Every permission check goes through [`Role::allows`], an exhaustive match,
//! so adding a role or a permission is a compile error until the table is
//! filled in.

use std::fmt;

use crate::error::{Error, Result};
pub use crate::model::Role;
use crate::model::User;

/// An action gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Add ships.
    CreateShip,
    /// Change ships.
    EditShip,
    /// Remove ships (cascades to components and jobs).
    DeleteShip,
    /// Add components.
    CreateComponent,
    /// Change components.
    EditComponent,
    /// Remove components (cascades to jobs).
    DeleteComponent,
    /// Schedule jobs.
    CreateJob,
    /// Change jobs, including their status.
    EditJob,
    /// Remove jobs.
    DeleteJob,
    /// Choose the engineer on a job.
    AssignJob,
    /// See dashboard statistics.
    ViewReports,
}

impl Permission {
    /// Every permission.
    pub const ALL: [Permission; 11] = [
        Permission::CreateShip,
        Permission::EditShip,
        Permission::DeleteShip,
        Permission::CreateComponent,
        Permission::EditComponent,
        Permission::DeleteComponent,
        Permission::CreateJob,
        Permission::EditJob,
        Permission::DeleteJob,
        Permission::AssignJob,
        Permission::ViewReports,
    ];
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::CreateShip => "create ships",
            Self::EditShip => "edit ships",
            Self::DeleteShip => "delete ships",
            Self::CreateComponent => "create components",
            Self::EditComponent => "edit components",
            Self::DeleteComponent => "delete components",
            Self::CreateJob => "create jobs",
            Self::EditJob => "edit jobs",
            Self::DeleteJob => "delete jobs",
            Self::AssignJob => "assign jobs",
            Self::ViewReports => "view reports",
        };
        f.write_str(text)
    }
}

impl Role {
    /// Whether this role holds `permission`.
    #[must_use]
    pub fn allows(self, permission: Permission) -> bool {
        use Permission::{
            AssignJob, CreateComponent, CreateJob, CreateShip, DeleteComponent, DeleteJob,
            DeleteShip, EditComponent, EditJob, EditShip, ViewReports,
        };

        match self {
            Role::Admin => true,
            Role::Inspector => match permission {
                CreateComponent | EditComponent | CreateJob | EditJob | AssignJob
                | ViewReports => true,
                CreateShip | EditShip | DeleteShip | DeleteComponent | DeleteJob => false,
            },
            // Engineers may only move their jobs along.
            Role::Engineer => match permission {
                EditJob => true,
                CreateShip | EditShip | DeleteShip | CreateComponent | EditComponent
                | DeleteComponent | CreateJob | DeleteJob | AssignJob | ViewReports => false,
            },
        }
    }

    /// All permissions this role holds.
    #[must_use]
    pub fn permissions(self) -> Vec<Permission> {
        Permission::ALL
            .into_iter()
            .filter(|p| self.allows(*p))
            .collect()
    }
}

/// Check that `user` may perform `permission`.
///
/// # Errors
///
/// Returns [`Error::Unauthenticated`] if there is no user and
/// [`Error::PermissionDenied`] if the user's role lacks the permission.
pub fn require(user: Option<&User>, permission: Permission) -> Result<()> {
    let user = user.ok_or_else(|| Error::Unauthenticated("not logged in".to_string()))?;
    if user.role.allows(permission) {
        Ok(())
    } else {
        Err(Error::PermissionDenied {
            role: user.role,
            permission,
        })
    }
}

/// Find the user matching `email` and `password` exactly.
#[must_use]
pub fn find_user<'a>(users: &'a [User], email: &str, password: &str) -> Option<&'a User> {
    users
        .iter()
        .find(|u| u.email == email && u.password == password)
}
