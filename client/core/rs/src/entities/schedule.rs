use serde::{Deserialize, Serialize};
use strum::EnumString;
use typeshare::typeshare;

/// How often a recurring scan repeats.
#[typeshare]
#[derive(
  Serialize,
  Deserialize,
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub enum Frequency {
  #[default]
  Daily,
  Weekly,
  Monthly,
}

/// The anchor a monthly recurrence pins its firing day to.
#[typeshare]
#[derive(
  Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum MonthlyType {
  /// A fixed day of the month (1-31).
  Date,
  /// The Nth (or last) occurrence of a weekday.
  Day,
}

/// Week-of-month ordinal for monthly-by-day recurrences.
#[typeshare]
#[derive(
  Serialize,
  Deserialize,
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  EnumString,
)]
pub enum MonthlyWeek {
  #[serde(alias = "first")]
  #[strum(serialize = "First", serialize = "first")]
  First,
  #[serde(alias = "second")]
  #[strum(serialize = "Second", serialize = "second")]
  Second,
  #[serde(alias = "third")]
  #[strum(serialize = "Third", serialize = "third")]
  Third,
  #[serde(alias = "fourth")]
  #[strum(serialize = "Fourth", serialize = "fourth")]
  Fourth,
  #[serde(alias = "last")]
  #[strum(serialize = "Last", serialize = "last")]
  Last,
}

/// User authored description of when a scan should repeat.
/// Exactly one frequency-specific field group must be populated,
/// otherwise compilation to cron fails.
#[typeshare]
#[derive(
  Serialize, Deserialize, Debug, Clone, Default, PartialEq,
)]
pub struct RecurrenceSpec {
  #[serde(default)]
  pub frequency: Frequency,
  /// Weekday names. Required non-empty for Weekly, ignored otherwise.
  #[serde(default)]
  pub selected_days: Vec<String>,
  /// Required for Monthly.
  #[serde(default)]
  pub monthly_type: Option<MonthlyType>,
  /// Day of the month (1-31). Required for Monthly / Date.
  #[serde(default)]
  pub monthly_date: u32,
  /// Weekday name. Required for Monthly / Day.
  #[serde(default)]
  pub monthly_day: String,
  /// Week ordinal name. Required for Monthly / Day.
  #[serde(default)]
  pub monthly_week: String,
}

/// A recurring scan registration.
///
/// Read by the schedule registry on every process start.
/// Never mutated by the scheduler itself.
#[typeshare]
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanSchedule {
  pub id: String,
  /// The scan this schedule deploys when it fires.
  pub scan_id: String,
  /// Structured recurrence, compiled to cron at registration time.
  #[serde(default)]
  pub recurrence: Option<RecurrenceSpec>,
  /// Explicit cron expression. Used verbatim and takes precedence
  /// over `recurrence` when non-empty.
  #[serde(default)]
  pub cron_expression: String,
  /// RFC 3339.
  #[serde(default)]
  pub start_date: String,
  /// RFC 3339. Once in the past the schedule is expired and must not fire.
  /// Empty means the schedule never expires.
  #[serde(default)]
  pub end_date: String,
  /// Creation timestamp in unix ms.
  #[serde(default)]
  pub created_at: i64,
}
