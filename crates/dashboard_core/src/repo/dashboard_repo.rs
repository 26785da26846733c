//! Dashboard repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped CRUD APIs over `dashboards`, `dashboard_ranges` and
//!   `dashboard_entries`.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Each public operation is one transaction; writes use `IMMEDIATE` so
//!   concurrent writers serialize on the SQLite write lock.
//! - Returned dashboards always carry materialized `ranges`/`items`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::dashboard::{
    Dashboard, DashboardEntry, DashboardId, DashboardValidationError, EntryId, EntryType,
    Interval, NamedDateRange, NewEntry, NewRange, RangeId,
};
use crate::model::user::UserId;
use crate::repo::cascade::{cascade_delete_dashboard, CascadeReport};
use crate::repo::ownership::{
    require_owned_dashboard, require_owned_entry, require_owned_range,
    require_range_in_dashboard,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TAG_SEPARATOR: &str = ",";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for dashboard persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(DashboardValidationError),
    Db(DbError),
    /// Dashboard does not exist or is owned by another user.
    DashboardNotFound(DashboardId),
    /// Range does not exist, is owned by another user, or is outside the
    /// target dashboard.
    RangeNotFound(RangeId),
    /// Entry does not exist or is owned by another user.
    EntryNotFound(EntryId),
    /// Range is still referenced by at least one entry.
    RangeInUse(RangeId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DashboardNotFound(id) => write!(f, "dashboard not found: {id}"),
            Self::RangeNotFound(id) => write!(f, "range not found: {id}"),
            Self::EntryNotFound(id) => write!(f, "entry not found: {id}"),
            Self::RangeInUse(id) => write!(f, "range {id} is used in entries"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "dashboard repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "dashboard repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "dashboard repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted dashboard data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DashboardValidationError> for RepoError {
    fn from(value: DashboardValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Snapshot of a removed dashboard and what was deleted with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedDashboard {
    /// Aggregate as it existed immediately before deletion.
    pub dashboard: Dashboard,
    pub cascade: CascadeReport,
}

/// Repository interface for owner-scoped dashboard operations.
pub trait DashboardRepository {
    /// Lists dashboards of `owner` in creation order.
    fn list_dashboards(&self, owner: UserId) -> RepoResult<Vec<Dashboard>>;
    /// Loads one owned dashboard with its children.
    fn get_dashboard(&self, owner: UserId, dashboard_id: DashboardId) -> RepoResult<Dashboard>;
    /// Creates an empty dashboard owned by `owner`.
    fn create_dashboard(&self, owner: UserId, name: &str) -> RepoResult<Dashboard>;
    /// Replaces the name of one owned dashboard.
    fn rename_dashboard(
        &self,
        owner: UserId,
        dashboard_id: DashboardId,
        name: &str,
    ) -> RepoResult<Dashboard>;
    /// Deletes one owned dashboard together with all of its children.
    fn remove_dashboard(
        &self,
        owner: UserId,
        dashboard_id: DashboardId,
    ) -> RepoResult<RemovedDashboard>;
    fn add_range(
        &self,
        owner: UserId,
        dashboard_id: DashboardId,
        range: &NewRange,
    ) -> RepoResult<NamedDateRange>;
    fn update_range(
        &self,
        owner: UserId,
        range_id: RangeId,
        range: &NewRange,
    ) -> RepoResult<NamedDateRange>;
    fn remove_range(&self, owner: UserId, range_id: RangeId) -> RepoResult<NamedDateRange>;
    fn add_entry(
        &self,
        owner: UserId,
        dashboard_id: DashboardId,
        entry: &NewEntry,
    ) -> RepoResult<DashboardEntry>;
    fn update_entry(
        &self,
        owner: UserId,
        entry_id: EntryId,
        entry: &NewEntry,
    ) -> RepoResult<DashboardEntry>;
    fn remove_entry(&self, owner: UserId, entry_id: EntryId) -> RepoResult<DashboardEntry>;
}

/// SQLite-backed dashboard repository.
pub struct SqliteDashboardRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDashboardRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_dashboard_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn write_tx(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }

    fn read_tx(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Deferred,
        )?)
    }
}

impl DashboardRepository for SqliteDashboardRepository<'_> {
    fn list_dashboards(&self, owner: UserId) -> RepoResult<Vec<Dashboard>> {
        let tx = self.read_tx()?;
        let mut dashboards = Vec::new();
        {
            let mut stmt = tx.prepare(
                "SELECT id, name
                 FROM dashboards
                 WHERE user_id = ?1
                 ORDER BY id ASC;",
            )?;
            let mut rows = stmt.query([owner])?;
            while let Some(row) = rows.next()? {
                let id: DashboardId = row.get("id")?;
                let name: String = row.get("name")?;
                dashboards.push(Dashboard::empty(id, owner, name));
            }
        }
        for dashboard in &mut dashboards {
            hydrate_children(&tx, dashboard)?;
        }
        tx.commit()?;
        Ok(dashboards)
    }

    fn get_dashboard(&self, owner: UserId, dashboard_id: DashboardId) -> RepoResult<Dashboard> {
        let tx = self.read_tx()?;
        let dashboard = load_owned_dashboard(&tx, owner, dashboard_id)?;
        tx.commit()?;
        Ok(dashboard)
    }

    fn create_dashboard(&self, owner: UserId, name: &str) -> RepoResult<Dashboard> {
        let tx = self.write_tx()?;
        tx.execute(
            "INSERT INTO dashboards (user_id, name) VALUES (?1, ?2);",
            params![owner, name],
        )?;
        let dashboard = Dashboard::empty(tx.last_insert_rowid(), owner, name);
        tx.commit()?;
        Ok(dashboard)
    }

    fn rename_dashboard(
        &self,
        owner: UserId,
        dashboard_id: DashboardId,
        name: &str,
    ) -> RepoResult<Dashboard> {
        let tx = self.write_tx()?;
        let changed = tx.execute(
            "UPDATE dashboards
             SET name = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND user_id = ?2;",
            params![dashboard_id, owner, name],
        )?;
        if changed == 0 {
            return Err(RepoError::DashboardNotFound(dashboard_id));
        }
        let dashboard = load_owned_dashboard(&tx, owner, dashboard_id)?;
        tx.commit()?;
        Ok(dashboard)
    }

    fn remove_dashboard(
        &self,
        owner: UserId,
        dashboard_id: DashboardId,
    ) -> RepoResult<RemovedDashboard> {
        let tx = self.write_tx()?;
        let dashboard = load_owned_dashboard(&tx, owner, dashboard_id)?;
        let cascade = cascade_delete_dashboard(&tx, owner, dashboard_id)?;
        tx.commit()?;
        Ok(RemovedDashboard { dashboard, cascade })
    }

    fn add_range(
        &self,
        owner: UserId,
        dashboard_id: DashboardId,
        range: &NewRange,
    ) -> RepoResult<NamedDateRange> {
        range.validate()?;

        let tx = self.write_tx()?;
        require_owned_dashboard(&tx, owner, dashboard_id)?;
        tx.execute(
            "INSERT INTO dashboard_ranges (
                dashboard_id,
                name,
                editable,
                range_from,
                range_to
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                dashboard_id,
                range.name.as_str(),
                bool_to_int(range.editable),
                range.from.as_str(),
                range.to.as_str(),
            ],
        )?;
        let created = load_range(&tx, tx.last_insert_rowid())?;
        tx.commit()?;
        Ok(created)
    }

    fn update_range(
        &self,
        owner: UserId,
        range_id: RangeId,
        range: &NewRange,
    ) -> RepoResult<NamedDateRange> {
        range.validate()?;

        let tx = self.write_tx()?;
        require_owned_range(&tx, owner, range_id)?;
        tx.execute(
            "UPDATE dashboard_ranges
             SET name = ?2,
                 editable = ?3,
                 range_from = ?4,
                 range_to = ?5
             WHERE id = ?1;",
            params![
                range_id,
                range.name.as_str(),
                bool_to_int(range.editable),
                range.from.as_str(),
                range.to.as_str(),
            ],
        )?;
        let updated = load_range(&tx, range_id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn remove_range(&self, owner: UserId, range_id: RangeId) -> RepoResult<NamedDateRange> {
        let tx = self.write_tx()?;
        require_owned_range(&tx, owner, range_id)?;
        let in_use: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM dashboard_entries
                WHERE range_id = ?1
            );",
            [range_id],
            |row| row.get(0),
        )?;
        if in_use == 1 {
            return Err(RepoError::RangeInUse(range_id));
        }

        let removed = load_range(&tx, range_id)?;
        tx.execute("DELETE FROM dashboard_ranges WHERE id = ?1;", [range_id])?;
        tx.commit()?;
        Ok(removed)
    }

    fn add_entry(
        &self,
        owner: UserId,
        dashboard_id: DashboardId,
        entry: &NewEntry,
    ) -> RepoResult<DashboardEntry> {
        entry.validate()?;

        let tx = self.write_tx()?;
        require_owned_dashboard(&tx, owner, dashboard_id)?;
        if let Some(range_id) = entry.range_id {
            require_range_in_dashboard(&tx, dashboard_id, range_id)?;
        }
        tx.execute(
            "INSERT INTO dashboard_entries (
                dashboard_id,
                title,
                entry_type,
                stats_interval,
                tags,
                range_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                dashboard_id,
                entry.title.as_str(),
                entry.entry_type.as_str(),
                entry.interval.as_str(),
                join_tags(&entry.tags),
                entry.range_id,
            ],
        )?;
        let created = load_entry(&tx, tx.last_insert_rowid())?;
        tx.commit()?;
        Ok(created)
    }

    fn update_entry(
        &self,
        owner: UserId,
        entry_id: EntryId,
        entry: &NewEntry,
    ) -> RepoResult<DashboardEntry> {
        entry.validate()?;

        let tx = self.write_tx()?;
        let dashboard_id = require_owned_entry(&tx, owner, entry_id)?;
        if let Some(range_id) = entry.range_id {
            require_range_in_dashboard(&tx, dashboard_id, range_id)?;
        }
        tx.execute(
            "UPDATE dashboard_entries
             SET title = ?2,
                 entry_type = ?3,
                 stats_interval = ?4,
                 tags = ?5,
                 range_id = ?6
             WHERE id = ?1;",
            params![
                entry_id,
                entry.title.as_str(),
                entry.entry_type.as_str(),
                entry.interval.as_str(),
                join_tags(&entry.tags),
                entry.range_id,
            ],
        )?;
        let updated = load_entry(&tx, entry_id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn remove_entry(&self, owner: UserId, entry_id: EntryId) -> RepoResult<DashboardEntry> {
        let tx = self.write_tx()?;
        require_owned_entry(&tx, owner, entry_id)?;
        let removed = load_entry(&tx, entry_id)?;
        tx.execute("DELETE FROM dashboard_entries WHERE id = ?1;", [entry_id])?;
        tx.commit()?;
        Ok(removed)
    }
}

fn load_owned_dashboard(
    conn: &Connection,
    owner: UserId,
    dashboard_id: DashboardId,
) -> RepoResult<Dashboard> {
    let mut dashboard = require_owned_dashboard(conn, owner, dashboard_id)?;
    hydrate_children(conn, &mut dashboard)?;
    Ok(dashboard)
}

fn hydrate_children(conn: &Connection, dashboard: &mut Dashboard) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "SELECT id, dashboard_id, name, editable, range_from, range_to
         FROM dashboard_ranges
         WHERE dashboard_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([dashboard.id])?;
    while let Some(row) = rows.next()? {
        dashboard.ranges.push(parse_range_row(row)?);
    }

    let mut stmt = conn.prepare(
        "SELECT id, dashboard_id, title, entry_type, stats_interval, tags, range_id
         FROM dashboard_entries
         WHERE dashboard_id = ?1
         ORDER BY id ASC;",
    )?;
    let mut rows = stmt.query([dashboard.id])?;
    while let Some(row) = rows.next()? {
        dashboard.items.push(parse_entry_row(row)?);
    }

    Ok(())
}

fn load_range(conn: &Connection, range_id: RangeId) -> RepoResult<NamedDateRange> {
    let mut stmt = conn.prepare(
        "SELECT id, dashboard_id, name, editable, range_from, range_to
         FROM dashboard_ranges
         WHERE id = ?1;",
    )?;
    let mut rows = stmt.query([range_id])?;
    if let Some(row) = rows.next()? {
        return parse_range_row(row);
    }
    Err(RepoError::RangeNotFound(range_id))
}

fn load_entry(conn: &Connection, entry_id: EntryId) -> RepoResult<DashboardEntry> {
    let mut stmt = conn.prepare(
        "SELECT id, dashboard_id, title, entry_type, stats_interval, tags, range_id
         FROM dashboard_entries
         WHERE id = ?1;",
    )?;
    let mut rows = stmt.query([entry_id])?;
    if let Some(row) = rows.next()? {
        return parse_entry_row(row);
    }
    Err(RepoError::EntryNotFound(entry_id))
}

fn parse_range_row(row: &Row<'_>) -> RepoResult<NamedDateRange> {
    let editable = match row.get::<_, i64>("editable")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid editable value `{other}` in dashboard_ranges.editable"
            )));
        }
    };

    Ok(NamedDateRange {
        id: row.get("id")?,
        dashboard_id: row.get("dashboard_id")?,
        name: row.get("name")?,
        editable,
        from: row.get("range_from")?,
        to: row.get("range_to")?,
    })
}

fn parse_entry_row(row: &Row<'_>) -> RepoResult<DashboardEntry> {
    let type_text: String = row.get("entry_type")?;
    let entry_type = EntryType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid entry type `{type_text}` in dashboard_entries.entry_type"
        ))
    })?;

    let interval_text: String = row.get("stats_interval")?;
    let interval = Interval::parse(&interval_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid interval `{interval_text}` in dashboard_entries.stats_interval"
        ))
    })?;

    let tags_text: String = row.get("tags")?;

    Ok(DashboardEntry {
        id: row.get("id")?,
        dashboard_id: row.get("dashboard_id")?,
        title: row.get("title")?,
        entry_type,
        interval,
        tags: split_tags(&tags_text),
        range_id: row.get("range_id")?,
    })
}

fn join_tags(tags: &[String]) -> String {
    tags.join(TAG_SEPARATOR)
}

fn split_tags(value: &str) -> Vec<String> {
    value
        .split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_dashboard_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let required: [(&'static str, &[&'static str]); 3] = [
        ("dashboards", &["id", "user_id", "name"]),
        (
            "dashboard_ranges",
            &["id", "dashboard_id", "name", "editable", "range_from", "range_to"],
        ),
        (
            "dashboard_entries",
            &[
                "id",
                "dashboard_id",
                "title",
                "entry_type",
                "stats_interval",
                "tags",
                "range_id",
            ],
        ),
    ];

    for (table, columns) in required {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::{join_tags, split_tags};

    #[test]
    fn tags_split_skips_empty_segments() {
        assert_eq!(split_tags(""), Vec::<String>::new());
        assert_eq!(split_tags("a,,b"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn tags_join_keeps_values_verbatim() {
        let tags = vec!["client a".to_string(), "type".to_string()];
        let joined = join_tags(&tags);
        assert_eq!(joined, "client a,type");
        assert_eq!(split_tags(&joined), tags);
    }
}
