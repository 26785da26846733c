//! Resolver-style dashboard API for transport layers.
//!
//! # Responsibility
//! - Expose use-case-level dashboard operations for an authenticated caller.
//! - Map core aggregates into serializable response shapes.
//!
//! # Invariants
//! - Every call opens its own connection; no connection state is shared.
//! - Responses never carry the owner id.
//! - `ranges` and `items` are always present, possibly empty.

use dashboard_core::db::{open_db, DbError};
use dashboard_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, Dashboard,
    DashboardEntry, DashboardId, DashboardService, DashboardServiceError, DashboardServiceResult,
    EntryId, EntryType, Interval, LoggingError, NamedDateRange, NewEntry, NewRange, RangeId,
    RepoError, SqliteDashboardRepository, User,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DB_PATH_ENV: &str = "DASHBOARD_DB_PATH";
const DB_FILE_NAME: &str = "dashboards.sqlite3";

/// Expose core crate version.
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Safe to call repeatedly with the same `level + log_dir`.
pub fn init_logging(level: &str, log_dir: &str) -> ResolverResult<()> {
    init_logging_inner(level, log_dir).map_err(ResolverError::Logging)
}

pub type ResolverResult<T> = Result<T, ResolverError>;

/// Error returned by resolver calls.
#[derive(Debug)]
pub enum ResolverError {
    /// Database could not be opened or migrated.
    Open(DbError),
    /// Opened database is not usable by the dashboard repository.
    Init(RepoError),
    /// Use-case failure, including ownership not-found errors.
    Service(DashboardServiceError),
    Logging(LoggingError),
}

impl ResolverError {
    /// Returns whether the caller targeted a record it cannot see.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Service(err) if err.is_not_found())
    }
}

impl Display for ResolverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "dashboard DB open failed: {err}"),
            Self::Init(err) => write!(f, "dashboard repo init failed: {err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResolverError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) => Some(err),
            Self::Init(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<DashboardServiceError> for ResolverError {
    fn from(value: DashboardServiceError) -> Self {
        Self::Service(value)
    }
}

/// Dashboard response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub id: DashboardId,
    pub name: String,
    pub ranges: Vec<NamedDateRangeView>,
    pub items: Vec<DashboardEntryView>,
}

/// Named date range response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedDateRangeView {
    pub id: RangeId,
    pub name: String,
    pub editable: bool,
    pub range: DateRangeView,
}

/// Raw `from`/`to` pair of a named range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeView {
    pub from: String,
    pub to: String,
}

/// Dashboard entry response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardEntryView {
    pub id: EntryId,
    pub title: String,
    pub entry_type: EntryType,
    pub interval: Interval,
    pub tags: Vec<String>,
    pub range_id: Option<RangeId>,
}

impl From<Dashboard> for DashboardView {
    fn from(value: Dashboard) -> Self {
        Self {
            id: value.id,
            name: value.name,
            ranges: value.ranges.into_iter().map(Into::into).collect(),
            items: value.items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<NamedDateRange> for NamedDateRangeView {
    fn from(value: NamedDateRange) -> Self {
        Self {
            id: value.id,
            name: value.name,
            editable: value.editable,
            range: DateRangeView {
                from: value.from,
                to: value.to,
            },
        }
    }
}

impl From<DashboardEntry> for DashboardEntryView {
    fn from(value: DashboardEntry) -> Self {
        Self {
            id: value.id,
            title: value.title,
            entry_type: value.entry_type,
            interval: value.interval,
            tags: value.tags,
            range_id: value.range_id,
        }
    }
}

/// Input for adding or replacing a named range.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeInput {
    pub name: String,
    /// Defaults to `true` when omitted.
    #[serde(default)]
    pub editable: Option<bool>,
    pub range: DateRangeView,
}

impl From<RangeInput> for NewRange {
    fn from(value: RangeInput) -> Self {
        let mut range = NewRange::new(value.name, value.range.from, value.range.to);
        if let Some(editable) = value.editable {
            range.editable = editable;
        }
        range
    }
}

/// Input for adding or replacing a dashboard entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryInput {
    pub title: String,
    pub entry_type: EntryType,
    pub interval: Interval,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub range_id: Option<RangeId>,
}

impl From<EntryInput> for NewEntry {
    fn from(value: EntryInput) -> Self {
        let mut entry = NewEntry::new(value.title, value.entry_type, value.interval);
        entry.tags = value.tags;
        entry.range_id = value.range_id;
        entry
    }
}

/// Entry point bound to one SQLite database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardResolver {
    db_path: PathBuf,
}

impl DashboardResolver {
    /// Creates a resolver over an explicit database path.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Creates a resolver from `DASHBOARD_DB_PATH`, or a temp-dir file.
    pub fn from_env() -> Self {
        Self::new(db_path_from(std::env::var(DB_PATH_ENV).ok()))
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Lists the caller's dashboards in creation order.
    pub fn dashboards(&self, identity: &User) -> ResolverResult<Vec<DashboardView>> {
        let dashboards = self.with_service(|service| service.list_dashboards(identity))?;
        Ok(dashboards.into_iter().map(Into::into).collect())
    }

    /// Loads one dashboard of the caller.
    pub fn dashboard(
        &self,
        identity: &User,
        dashboard_id: DashboardId,
    ) -> ResolverResult<DashboardView> {
        self.with_service(|service| service.get_dashboard(identity, dashboard_id))
            .map(Into::into)
    }

    /// Creates an empty dashboard for the caller.
    pub fn create_dashboard(&self, identity: &User, name: &str) -> ResolverResult<DashboardView> {
        self.with_service(|service| service.create_dashboard(identity, name))
            .map(Into::into)
    }

    /// Renames one of the caller's dashboards.
    pub fn update_dashboard(
        &self,
        identity: &User,
        dashboard_id: DashboardId,
        name: &str,
    ) -> ResolverResult<DashboardView> {
        self.with_service(|service| service.rename_dashboard(identity, dashboard_id, name))
            .map(Into::into)
    }

    /// Removes one of the caller's dashboards and returns its last state.
    pub fn remove_dashboard(
        &self,
        identity: &User,
        dashboard_id: DashboardId,
    ) -> ResolverResult<DashboardView> {
        self.with_service(|service| service.remove_dashboard(identity, dashboard_id))
            .map(Into::into)
    }

    pub fn add_range(
        &self,
        identity: &User,
        dashboard_id: DashboardId,
        input: RangeInput,
    ) -> ResolverResult<NamedDateRangeView> {
        let range = NewRange::from(input);
        self.with_service(|service| service.add_range(identity, dashboard_id, &range))
            .map(Into::into)
    }

    pub fn update_range(
        &self,
        identity: &User,
        range_id: RangeId,
        input: RangeInput,
    ) -> ResolverResult<NamedDateRangeView> {
        let range = NewRange::from(input);
        self.with_service(|service| service.update_range(identity, range_id, &range))
            .map(Into::into)
    }

    pub fn remove_range(
        &self,
        identity: &User,
        range_id: RangeId,
    ) -> ResolverResult<NamedDateRangeView> {
        self.with_service(|service| service.remove_range(identity, range_id))
            .map(Into::into)
    }

    pub fn add_entry(
        &self,
        identity: &User,
        dashboard_id: DashboardId,
        input: EntryInput,
    ) -> ResolverResult<DashboardEntryView> {
        let entry = NewEntry::from(input);
        self.with_service(|service| service.add_entry(identity, dashboard_id, &entry))
            .map(Into::into)
    }

    pub fn update_entry(
        &self,
        identity: &User,
        entry_id: EntryId,
        input: EntryInput,
    ) -> ResolverResult<DashboardEntryView> {
        let entry = NewEntry::from(input);
        self.with_service(|service| service.update_entry(identity, entry_id, &entry))
            .map(Into::into)
    }

    pub fn remove_entry(
        &self,
        identity: &User,
        entry_id: EntryId,
    ) -> ResolverResult<DashboardEntryView> {
        self.with_service(|service| service.remove_entry(identity, entry_id))
            .map(Into::into)
    }

    fn with_service<T>(
        &self,
        f: impl FnOnce(&DashboardService<SqliteDashboardRepository<'_>>) -> DashboardServiceResult<T>,
    ) -> ResolverResult<T> {
        let conn = open_db(&self.db_path).map_err(|err| {
            warn!("event=resolver_open module=api status=error error={err}");
            ResolverError::Open(err)
        })?;
        let repo = SqliteDashboardRepository::try_new(&conn).map_err(|err| {
            warn!("event=resolver_init module=api status=error error={err}");
            ResolverError::Init(err)
        })?;
        let service = DashboardService::new(repo);
        Ok(f(&service)?)
    }
}

fn db_path_from(raw: Option<String>) -> PathBuf {
    if let Some(raw) = raw {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    std::env::temp_dir().join(DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{core_version, db_path_from, init_logging, RangeInput, DB_FILE_NAME};
    use dashboard_core::NewRange;
    use std::path::PathBuf;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(init_logging("info", "").is_err());
        assert!(init_logging("verbose", "/tmp/logs").is_err());
    }

    #[test]
    fn db_path_prefers_trimmed_override() {
        assert_eq!(
            db_path_from(Some("  /srv/dash.sqlite3 ".to_string())),
            PathBuf::from("/srv/dash.sqlite3")
        );
    }

    #[test]
    fn db_path_falls_back_to_temp_dir() {
        let fallback = std::env::temp_dir().join(DB_FILE_NAME);
        assert_eq!(db_path_from(None), fallback);
        assert_eq!(db_path_from(Some("   ".to_string())), fallback);
    }

    #[test]
    fn range_input_defaults_to_editable() {
        let input: RangeInput = serde_json::from_str(
            r#"{"name":"week","range":{"from":"now-7d","to":"now"}}"#,
        )
        .unwrap();
        let range = NewRange::from(input);
        assert!(range.editable);
        assert_eq!(range.from, "now-7d");
    }
}
