//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for dashboards.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Every dashboard lookup is a compound `id + owner` predicate evaluated in
//!   the same transaction as the mutation it guards.
//! - Dashboard removal deletes children explicitly before the parent row.
//! - Repository APIs return semantic errors (`DashboardNotFound`, ...) in
//!   addition to DB transport errors.

pub mod cascade;
pub mod dashboard_repo;
pub mod ownership;
