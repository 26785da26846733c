//! Resolver entry points over `dashboard_core`.

pub mod api;

pub use api::{
    core_version, init_logging, DashboardEntryView, DashboardResolver, DashboardView,
    DateRangeView, EntryInput, NamedDateRangeView, RangeInput, ResolverError, ResolverResult,
};
pub use dashboard_core::{EntryType, Interval, User, UserId};
