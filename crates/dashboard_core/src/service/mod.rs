//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-scoped use-case APIs.
//! - Keep resolver/transport layers decoupled from storage details.

pub mod dashboard_service;
