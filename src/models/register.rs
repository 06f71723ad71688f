use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::schedule::Perspective;

/// A single spreadsheet cell as handed over by the I/O layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RawCell {
    #[default]
    Missing,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl RawCell {
    pub fn text(value: impl Into<String>) -> Self {
        RawCell::Text(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawCell::Missing)
    }

    /// Numeric reading of the cell; numeric text is accepted after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawCell::Number(value) if value.is_finite() => Some(*value),
            RawCell::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
            RawCell::Text(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite()),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            RawCell::Bool(flag) => *flag,
            RawCell::Number(value) => (*value - 1.0).abs() < f64::EPSILON,
            RawCell::Text(raw) => matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "1" | "1.0" | "true" | "yes" | "y" | "x"
            ),
            _ => false,
        }
    }
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::Missing => Ok(()),
            RawCell::Bool(flag) => write!(f, "{flag}"),
            RawCell::Number(value) => write!(f, "{value}"),
            RawCell::Date(date) => write!(f, "{date}"),
            RawCell::DateTime(value) => write!(f, "{value}"),
            RawCell::Text(raw) => f.write_str(raw),
        }
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        RawCell::Text(value.to_string())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        RawCell::Text(value)
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        RawCell::Number(value)
    }
}

impl From<i64> for RawCell {
    fn from(value: i64) -> Self {
        RawCell::Number(value as f64)
    }
}

impl From<i32> for RawCell {
    fn from(value: i32) -> Self {
        RawCell::Number(f64::from(value))
    }
}

impl From<bool> for RawCell {
    fn from(value: bool) -> Self {
        RawCell::Bool(value)
    }
}

impl From<NaiveDate> for RawCell {
    fn from(value: NaiveDate) -> Self {
        RawCell::Date(value)
    }
}

impl<T: Into<RawCell>> From<Option<T>> for RawCell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawCell::Missing)
    }
}

/// One row of the register, with field names already mapped by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRow {
    pub id: String,
    #[serde(default)]
    pub group_key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub weight: RawCell,
    #[serde(default)]
    pub schedule_offset: RawCell,
    #[serde(default)]
    pub completion_flag: RawCell,
    #[serde(default)]
    pub actual_dates: BTreeMap<String, RawCell>,
    #[serde(default)]
    pub expected_dates: BTreeMap<String, RawCell>,
}

impl RegisterRow {
    pub fn new(id: impl Into<String>, group_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            group_key: group_key.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_weight(mut self, weight: impl Into<RawCell>) -> Self {
        self.weight = weight.into();
        self
    }

    pub fn with_offset(mut self, offset: impl Into<RawCell>) -> Self {
        self.schedule_offset = offset.into();
        self
    }

    pub fn with_flag(mut self, flag: impl Into<RawCell>) -> Self {
        self.completion_flag = flag.into();
        self
    }

    pub fn with_actual(mut self, milestone: impl Into<String>, value: impl Into<RawCell>) -> Self {
        self.actual_dates.insert(milestone.into(), value.into());
        self
    }

    pub fn with_expected(
        mut self,
        milestone: impl Into<String>,
        value: impl Into<RawCell>,
    ) -> Self {
        self.expected_dates.insert(milestone.into(), value.into());
        self
    }
}

/// Canonical work item. Milestone vectors are index-aligned with the
/// configured schedule and only ever hold real dates or `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: String,
    pub group_key: String,
    pub title: Option<String>,
    pub status: Option<String>,
    pub weight: f64,
    pub schedule_offset_days: Option<i64>,
    pub completion_gate: bool,
    pub actual: Vec<Option<NaiveDate>>,
    pub expected: Vec<Option<NaiveDate>>,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, group_key: impl Into<String>, milestones: usize) -> Self {
        Self {
            id: id.into(),
            group_key: group_key.into(),
            title: None,
            status: None,
            weight: 1.0,
            schedule_offset_days: None,
            completion_gate: false,
            actual: vec![None; milestones],
            expected: vec![None; milestones],
        }
    }

    pub fn date(&self, perspective: Perspective, index: usize) -> Option<NaiveDate> {
        let dates = match perspective {
            Perspective::Actual => &self.actual,
            Perspective::Expected => &self.expected,
        };
        dates.get(index).copied().flatten()
    }

    pub fn dates(&self, perspective: Perspective) -> impl Iterator<Item = NaiveDate> + '_ {
        let dates = match perspective {
            Perspective::Actual => &self.actual,
            Perspective::Expected => &self.expected,
        };
        dates.iter().flatten().copied()
    }
}
