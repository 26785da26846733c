//! Ownership guard.
//!
//! Resolves `(owner, id)` pairs to records only when both match. A record
//! that exists but belongs to someone else yields the same `*NotFound` error
//! as a record that does not exist at all.

use crate::model::dashboard::{Dashboard, DashboardId, EntryId, RangeId};
use crate::model::user::UserId;
use crate::repo::dashboard_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Loads the dashboard header (no children) owned by `owner`.
pub fn require_owned_dashboard(
    conn: &Connection,
    owner: UserId,
    dashboard_id: DashboardId,
) -> RepoResult<Dashboard> {
    let name: Option<String> = conn
        .query_row(
            "SELECT name
             FROM dashboards
             WHERE id = ?1
               AND user_id = ?2;",
            params![dashboard_id, owner],
            |row| row.get(0),
        )
        .optional()?;

    match name {
        Some(name) => Ok(Dashboard::empty(dashboard_id, owner, name)),
        None => Err(RepoError::DashboardNotFound(dashboard_id)),
    }
}

/// Resolves a range to its parent dashboard when the caller owns that dashboard.
pub fn require_owned_range(
    conn: &Connection,
    owner: UserId,
    range_id: RangeId,
) -> RepoResult<DashboardId> {
    conn.query_row(
        "SELECT r.dashboard_id
         FROM dashboard_ranges r
         INNER JOIN dashboards d ON d.id = r.dashboard_id
         WHERE r.id = ?1
           AND d.user_id = ?2;",
        params![range_id, owner],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(RepoError::RangeNotFound(range_id))
}

/// Resolves an entry to its parent dashboard when the caller owns that dashboard.
pub fn require_owned_entry(
    conn: &Connection,
    owner: UserId,
    entry_id: EntryId,
) -> RepoResult<DashboardId> {
    conn.query_row(
        "SELECT e.dashboard_id
         FROM dashboard_entries e
         INNER JOIN dashboards d ON d.id = e.dashboard_id
         WHERE e.id = ?1
           AND d.user_id = ?2;",
        params![entry_id, owner],
        |row| row.get(0),
    )
    .optional()?
    .ok_or(RepoError::EntryNotFound(entry_id))
}

/// Ensures `range_id` is a range of `dashboard_id`.
///
/// Entries may only reference ranges of their own dashboard.
pub fn require_range_in_dashboard(
    conn: &Connection,
    dashboard_id: DashboardId,
    range_id: RangeId,
) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM dashboard_ranges
            WHERE id = ?1
              AND dashboard_id = ?2
        );",
        params![range_id, dashboard_id],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::RangeNotFound(range_id))
    }
}
