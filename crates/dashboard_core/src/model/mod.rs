//! Dashboard aggregate model.
//!
//! # Responsibility
//! - Define the dashboard aggregate and its exclusively owned children.
//! - Define the caller identity consumed for ownership scoping.
//!
//! # Invariants
//! - Every dashboard has exactly one owner, fixed at creation.
//! - Ranges and entries belong to exactly one dashboard and are never shared.

pub mod dashboard;
pub mod user;
