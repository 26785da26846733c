//! Dashboard use-case service.
//!
//! # Responsibility
//! - Expose list/create/rename/remove for the calling user's dashboards.
//! - Expose owner-guarded management of ranges and entries.
//! - Translate repository not-found variants into caller-facing errors.
//!
//! # Invariants
//! - Every operation except list and create is guarded by ownership of the
//!   target dashboard.
//! - "Not yours" and "does not exist" produce the same error.
//! - Persistence failures are returned unchanged, never retried.

use crate::model::dashboard::{
    Dashboard, DashboardEntry, DashboardId, DashboardValidationError, EntryId, NamedDateRange,
    NewEntry, NewRange, RangeId,
};
use crate::model::user::User;
use crate::repo::dashboard_repo::{DashboardRepository, RepoError};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from dashboard service operations.
#[derive(Debug)]
pub enum DashboardServiceError {
    /// Dashboard is missing or owned by another user.
    DashboardNotFound(DashboardId),
    /// Range is missing, owned by another user, or outside the dashboard.
    RangeNotFound(RangeId),
    /// Entry is missing or owned by another user.
    EntryNotFound(EntryId),
    /// Range is still referenced by an entry.
    RangeInUse(RangeId),
    /// Child record input failed validation.
    Validation(DashboardValidationError),
    /// Repository-level failure.
    Repo(RepoError),
}

impl DashboardServiceError {
    /// Returns whether this error is an ownership/not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::DashboardNotFound(_) | Self::RangeNotFound(_) | Self::EntryNotFound(_)
        )
    }
}

impl Display for DashboardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DashboardNotFound(_) => write!(f, "dashboard does not exist"),
            Self::RangeNotFound(_) => write!(f, "range does not exist"),
            Self::EntryNotFound(_) => write!(f, "entry does not exist"),
            Self::RangeInUse(_) => write!(f, "range is used in entries"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DashboardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DashboardServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DashboardNotFound(id) => Self::DashboardNotFound(id),
            RepoError::RangeNotFound(id) => Self::RangeNotFound(id),
            RepoError::EntryNotFound(id) => Self::EntryNotFound(id),
            RepoError::RangeInUse(id) => Self::RangeInUse(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

pub type DashboardServiceResult<T> = Result<T, DashboardServiceError>;

/// Dashboard service facade over repository implementations.
pub struct DashboardService<R: DashboardRepository> {
    repo: R,
}

impl<R: DashboardRepository> DashboardService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the caller's dashboards in creation order.
    ///
    /// Returns an empty list when the caller owns none.
    pub fn list_dashboards(&self, user: &User) -> DashboardServiceResult<Vec<Dashboard>> {
        Ok(self.repo.list_dashboards(user.id)?)
    }

    /// Loads one dashboard owned by the caller.
    pub fn get_dashboard(
        &self,
        user: &User,
        dashboard_id: DashboardId,
    ) -> DashboardServiceResult<Dashboard> {
        Ok(self.repo.get_dashboard(user.id, dashboard_id)?)
    }

    /// Creates an empty dashboard owned by the caller.
    ///
    /// Names are neither validated nor required to be unique.
    pub fn create_dashboard(
        &self,
        user: &User,
        name: impl Into<String>,
    ) -> DashboardServiceResult<Dashboard> {
        let name = name.into();
        let dashboard = self.repo.create_dashboard(user.id, name.as_str())?;
        info!(
            "event=dashboard_create module=service status=ok user_id={} dashboard_id={}",
            user.id, dashboard.id
        );
        Ok(dashboard)
    }

    /// Renames one owned dashboard in place.
    ///
    /// # Errors
    /// - `DashboardNotFound` when the dashboard is missing or not owned.
    pub fn rename_dashboard(
        &self,
        user: &User,
        dashboard_id: DashboardId,
        name: impl Into<String>,
    ) -> DashboardServiceResult<Dashboard> {
        let name = name.into();
        let dashboard = self
            .repo
            .rename_dashboard(user.id, dashboard_id, name.as_str())
            .inspect_err(|err| log_guard_failure("dashboard_rename", user, dashboard_id, err))?;
        info!(
            "event=dashboard_rename module=service status=ok user_id={} dashboard_id={}",
            user.id, dashboard.id
        );
        Ok(dashboard)
    }

    /// Removes one owned dashboard with all of its ranges and entries.
    ///
    /// Returns the dashboard as it was immediately before removal.
    ///
    /// # Errors
    /// - `DashboardNotFound` when the dashboard is missing or not owned.
    pub fn remove_dashboard(
        &self,
        user: &User,
        dashboard_id: DashboardId,
    ) -> DashboardServiceResult<Dashboard> {
        let removed = self
            .repo
            .remove_dashboard(user.id, dashboard_id)
            .inspect_err(|err| log_guard_failure("dashboard_remove", user, dashboard_id, err))?;
        info!(
            "event=dashboard_remove module=service status=ok user_id={} dashboard_id={} ranges_deleted={} entries_deleted={}",
            user.id,
            dashboard_id,
            removed.cascade.ranges_deleted,
            removed.cascade.entries_deleted
        );
        Ok(removed.dashboard)
    }

    /// Adds a named date range to an owned dashboard.
    pub fn add_range(
        &self,
        user: &User,
        dashboard_id: DashboardId,
        range: &NewRange,
    ) -> DashboardServiceResult<NamedDateRange> {
        Ok(self.repo.add_range(user.id, dashboard_id, range)?)
    }

    /// Replaces all fields of an owned range.
    pub fn update_range(
        &self,
        user: &User,
        range_id: RangeId,
        range: &NewRange,
    ) -> DashboardServiceResult<NamedDateRange> {
        Ok(self.repo.update_range(user.id, range_id, range)?)
    }

    /// Removes an owned range that no entry references.
    pub fn remove_range(
        &self,
        user: &User,
        range_id: RangeId,
    ) -> DashboardServiceResult<NamedDateRange> {
        Ok(self.repo.remove_range(user.id, range_id)?)
    }

    /// Adds a display entry to an owned dashboard.
    ///
    /// `entry.range_id`, when set, must be a range of the same dashboard.
    pub fn add_entry(
        &self,
        user: &User,
        dashboard_id: DashboardId,
        entry: &NewEntry,
    ) -> DashboardServiceResult<DashboardEntry> {
        Ok(self.repo.add_entry(user.id, dashboard_id, entry)?)
    }

    /// Replaces all fields of an owned entry.
    pub fn update_entry(
        &self,
        user: &User,
        entry_id: EntryId,
        entry: &NewEntry,
    ) -> DashboardServiceResult<DashboardEntry> {
        Ok(self.repo.update_entry(user.id, entry_id, entry)?)
    }

    /// Removes an owned entry.
    pub fn remove_entry(
        &self,
        user: &User,
        entry_id: EntryId,
    ) -> DashboardServiceResult<DashboardEntry> {
        Ok(self.repo.remove_entry(user.id, entry_id)?)
    }
}

fn log_guard_failure(event: &str, user: &User, dashboard_id: DashboardId, err: &RepoError) {
    if let RepoError::DashboardNotFound(_) = err {
        debug!(
            "event={event} module=service status=not_found user_id={} dashboard_id={dashboard_id}",
            user.id
        );
    }
}
