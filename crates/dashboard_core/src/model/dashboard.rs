//! Dashboard, named date range and dashboard entry records.
//!
//! # Responsibility
//! - Define the aggregate shape returned by repository and service layers.
//! - Validate child record input before persistence.
//!
//! # Invariants
//! - `Dashboard::ranges` and `Dashboard::items` are always materialized,
//!   empty when the dashboard has no children.
//! - Children are ordered by creation (ascending id).
//! - Tags are non-blank, carry no surrounding whitespace and never contain
//!   `,`; they are persisted verbatim as one comma-joined column.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DashboardId = i64;
pub type RangeId = i64;
pub type EntryId = i64;

/// Dashboard aggregate: one owner, ordered ranges and entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub id: DashboardId,
    pub owner_id: UserId,
    pub name: String,
    pub ranges: Vec<NamedDateRange>,
    pub items: Vec<DashboardEntry>,
}

impl Dashboard {
    /// Creates a dashboard with no ranges and no items.
    pub fn empty(id: DashboardId, owner_id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            owner_id,
            name: name.into(),
            ranges: Vec::new(),
            items: Vec::new(),
        }
    }
}

/// Labeled date interval owned by one dashboard.
///
/// `from`/`to` are kept verbatim (relative expressions like `now-7d` or
/// static dates); interpretation happens outside the dashboard core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedDateRange {
    pub id: RangeId,
    pub dashboard_id: DashboardId,
    pub name: String,
    pub editable: bool,
    pub from: String,
    pub to: String,
}

/// Visualization kind of a dashboard entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    PieChart,
    BarChart,
    StackedBarChart,
    LineChart,
    VerticalTable,
    HorizontalTable,
}

impl EntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PieChart => "pie_chart",
            Self::BarChart => "bar_chart",
            Self::StackedBarChart => "stacked_bar_chart",
            Self::LineChart => "line_chart",
            Self::VerticalTable => "vertical_table",
            Self::HorizontalTable => "horizontal_table",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pie_chart" => Some(Self::PieChart),
            "bar_chart" => Some(Self::BarChart),
            "stacked_bar_chart" => Some(Self::StackedBarChart),
            "line_chart" => Some(Self::LineChart),
            "vertical_table" => Some(Self::VerticalTable),
            "horizontal_table" => Some(Self::HorizontalTable),
            _ => None,
        }
    }
}

/// Bucket size used when an entry aggregates time spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Display item owned by one dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardEntry {
    pub id: EntryId,
    pub dashboard_id: DashboardId,
    pub title: String,
    pub entry_type: EntryType,
    pub interval: Interval,
    pub tags: Vec<String>,
    /// Range of the same dashboard this entry is filtered by, if any.
    pub range_id: Option<RangeId>,
}

/// Input for creating or replacing a named date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRange {
    pub name: String,
    pub editable: bool,
    pub from: String,
    pub to: String,
}

impl NewRange {
    pub fn new(name: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            editable: true,
            from: from.into(),
            to: to.into(),
        }
    }

    /// Checks field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), DashboardValidationError> {
        if self.name.trim().is_empty() {
            return Err(DashboardValidationError::BlankRangeName);
        }
        if self.from.trim().is_empty() || self.to.trim().is_empty() {
            return Err(DashboardValidationError::BlankRangeBound);
        }
        Ok(())
    }
}

/// Input for creating or replacing a dashboard entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub title: String,
    pub entry_type: EntryType,
    pub interval: Interval,
    pub tags: Vec<String>,
    pub range_id: Option<RangeId>,
}

impl NewEntry {
    pub fn new(title: impl Into<String>, entry_type: EntryType, interval: Interval) -> Self {
        Self {
            title: title.into(),
            entry_type,
            interval,
            tags: Vec::new(),
            range_id: None,
        }
    }

    /// Checks field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), DashboardValidationError> {
        if self.title.trim().is_empty() {
            return Err(DashboardValidationError::BlankEntryTitle);
        }
        for tag in &self.tags {
            if tag.trim().is_empty() || tag.trim() != tag || tag.contains(',') {
                return Err(DashboardValidationError::InvalidTag(tag.clone()));
            }
        }
        Ok(())
    }
}

/// Field-level validation failure for child record input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardValidationError {
    BlankRangeName,
    BlankRangeBound,
    BlankEntryTitle,
    InvalidTag(String),
}

impl Display for DashboardValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankRangeName => write!(f, "range name must not be blank"),
            Self::BlankRangeBound => write!(f, "range from/to must not be blank"),
            Self::BlankEntryTitle => write!(f, "entry title must not be blank"),
            Self::InvalidTag(tag) => write!(f, "invalid tag `{tag}`"),
        }
    }
}

impl Error for DashboardValidationError {}

#[cfg(test)]
mod tests {
    use super::{
        Dashboard, DashboardValidationError, EntryType, Interval, NewEntry, NewRange,
    };

    #[test]
    fn empty_dashboard_materializes_child_collections() {
        let dashboard = Dashboard::empty(7, 1, "weekly");
        assert!(dashboard.ranges.is_empty());
        assert!(dashboard.items.is_empty());
    }

    #[test]
    fn entry_type_and_interval_labels_roundtrip() {
        for kind in [
            EntryType::PieChart,
            EntryType::BarChart,
            EntryType::StackedBarChart,
            EntryType::LineChart,
            EntryType::VerticalTable,
            EntryType::HorizontalTable,
        ] {
            assert_eq!(EntryType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(Interval::parse("weekly"), Some(Interval::Weekly));
        assert_eq!(Interval::parse("fortnightly"), None);
    }

    #[test]
    fn range_validation_rejects_blank_fields() {
        assert_eq!(
            NewRange::new("  ", "now-7d", "now").validate(),
            Err(DashboardValidationError::BlankRangeName)
        );
        assert_eq!(
            NewRange::new("week", "now-7d", "").validate(),
            Err(DashboardValidationError::BlankRangeBound)
        );
        assert!(NewRange::new("week", "now-7d", "now").validate().is_ok());
    }

    #[test]
    fn entry_validation_rejects_comma_tags() {
        let mut entry = NewEntry::new("hours", EntryType::BarChart, Interval::Daily);
        entry.tags = vec!["proj:a,b".to_string()];
        assert!(matches!(
            entry.validate(),
            Err(DashboardValidationError::InvalidTag(_))
        ));

        entry.tags = vec!["proj".to_string()];
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn entry_validation_rejects_padded_tags() {
        let mut entry = NewEntry::new("hours", EntryType::BarChart, Interval::Daily);
        for padded in [" a ", "a ", "\tb"] {
            entry.tags = vec![padded.to_string()];
            assert_eq!(
                entry.validate(),
                Err(DashboardValidationError::InvalidTag(padded.to_string()))
            );
        }

        entry.tags = vec!["client a".to_string()];
        assert!(entry.validate().is_ok());
    }
}
