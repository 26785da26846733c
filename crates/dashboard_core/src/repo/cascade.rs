//! Cascade deleter for the dashboard aggregate.
//!
//! # Invariants
//! - Must run inside the caller's write transaction.
//! - Order is entries, ranges, dashboard: entries may reference ranges and
//!   both reference the dashboard, and the schema has no `ON DELETE CASCADE`.
//! - Every statement is scoped by owner, so another user's rows are never
//!   matched even when ids coincide.

use crate::model::dashboard::DashboardId;
use crate::model::user::UserId;
use crate::repo::dashboard_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection};

/// Number of child rows removed together with one dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub ranges_deleted: usize,
    pub entries_deleted: usize,
}

/// Deletes all entries and ranges of the dashboard, then the dashboard row.
///
/// Returns `DashboardNotFound` when no dashboard row matched, in which case
/// the caller must roll back.
pub fn cascade_delete_dashboard(
    conn: &Connection,
    owner: UserId,
    dashboard_id: DashboardId,
) -> RepoResult<CascadeReport> {
    let entries_deleted = conn.execute(
        "DELETE FROM dashboard_entries
         WHERE dashboard_id IN (
            SELECT id
            FROM dashboards
            WHERE id = ?1
              AND user_id = ?2
         );",
        params![dashboard_id, owner],
    )?;

    let ranges_deleted = conn.execute(
        "DELETE FROM dashboard_ranges
         WHERE dashboard_id IN (
            SELECT id
            FROM dashboards
            WHERE id = ?1
              AND user_id = ?2
         );",
        params![dashboard_id, owner],
    )?;

    let changed = conn.execute(
        "DELETE FROM dashboards
         WHERE id = ?1
           AND user_id = ?2;",
        params![dashboard_id, owner],
    )?;
    if changed == 0 {
        return Err(RepoError::DashboardNotFound(dashboard_id));
    }

    Ok(CascadeReport {
        ranges_deleted,
        entries_deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::{cascade_delete_dashboard, CascadeReport};
    use crate::db::open_db_in_memory;
    use crate::repo::dashboard_repo::RepoError;
    use rusqlite::params;

    #[test]
    fn deletes_children_before_parent() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO dashboards (id, user_id, name) VALUES (10, 1, 'd');",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO dashboard_ranges (id, dashboard_id, name, range_from, range_to)
             VALUES (20, 10, 'r', 'now-1d', 'now');",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO dashboard_entries (dashboard_id, title, entry_type, stats_interval, range_id)
             VALUES (10, 'e', 'bar_chart', 'daily', ?1);",
            params![20],
        )
        .unwrap();

        let report = cascade_delete_dashboard(&conn, 1, 10).unwrap();
        assert_eq!(
            report,
            CascadeReport {
                ranges_deleted: 1,
                entries_deleted: 1,
            }
        );
    }

    #[test]
    fn foreign_owner_matches_nothing() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch(
            "INSERT INTO dashboards (id, user_id, name) VALUES (10, 1, 'd');
             INSERT INTO dashboard_ranges (dashboard_id, name, range_from, range_to)
             VALUES (10, 'r', 'now-1d', 'now');",
        )
        .unwrap();

        let err = cascade_delete_dashboard(&conn, 2, 10).unwrap_err();
        assert!(matches!(err, RepoError::DashboardNotFound(10)));

        let ranges: i64 = conn
            .query_row("SELECT COUNT(*) FROM dashboard_ranges;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(ranges, 1);
    }
}
