//! Core domain logic for user-owned dashboards.
//! This crate is the single source of truth for ownership and cascade rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::dashboard::{
    Dashboard, DashboardEntry, DashboardId, DashboardValidationError, EntryId, EntryType,
    Interval, NamedDateRange, NewEntry, NewRange, RangeId,
};
pub use model::user::{User, UserId};
pub use repo::cascade::CascadeReport;
pub use repo::dashboard_repo::{
    DashboardRepository, RemovedDashboard, RepoError, RepoResult, SqliteDashboardRepository,
};
pub use service::dashboard_service::{
    DashboardService, DashboardServiceError, DashboardServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
