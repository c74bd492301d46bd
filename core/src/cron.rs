use std::str::FromStr;

use osprey_client::entities::{
  DayOfWeek,
  schedule::{Frequency, MonthlyType, MonthlyWeek, RecurrenceSpec},
};
use thiserror::Error;

/// Failure to turn a [RecurrenceSpec] into a cron expression.
/// Non fatal: the registry records it and skips the schedule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
  #[error("weekly recurrence selects no recognized weekday")]
  NoRecognizedDays,
  #[error("monthly recurrence is missing its monthly type")]
  MissingMonthlyType,
  #[error("day of month must be greater than 0")]
  DayOfMonthOutOfRange,
  #[error("unrecognized weekday `{0}`")]
  UnknownWeekday(String),
  #[error("unrecognized week ordinal `{0}`")]
  UnknownWeekOrdinal(String),
}

/// Compiles a recurrence spec into a six field (seconds leading)
/// cron expression firing at the start of each matched day.
///
/// The monthly-by-day forms use the Quartz style `#` / `L` day of
/// week qualifiers, which croner understands natively. Day of month
/// feasibility is not checked: a spec pinned to the 31st simply
/// skips months without one.
pub fn compile(
  spec: &RecurrenceSpec,
) -> Result<String, CompileError> {
  match spec.frequency {
    Frequency::Daily => Ok(String::from("0 0 0 * * *")),
    Frequency::Weekly => {
      // Unrecognized day names are dropped from the selection.
      // Only a selection which leaves nothing behind fails.
      let mut days = spec
        .selected_days
        .iter()
        .filter_map(|day| DayOfWeek::from_str(day).ok())
        .map(cron_day_of_week)
        .collect::<Vec<_>>();
      days.sort_unstable();
      days.dedup();
      if days.is_empty() {
        return Err(CompileError::NoRecognizedDays);
      }
      let days = days
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(",");
      Ok(format!("0 0 0 * * {days}"))
    }
    Frequency::Monthly => match spec.monthly_type {
      Some(MonthlyType::Date) => {
        if spec.monthly_date == 0 {
          return Err(CompileError::DayOfMonthOutOfRange);
        }
        Ok(format!("0 0 0 {} * *", spec.monthly_date))
      }
      Some(MonthlyType::Day) => {
        let day = DayOfWeek::from_str(&spec.monthly_day)
          .map(cron_day_of_week)
          .map_err(|_| {
            CompileError::UnknownWeekday(spec.monthly_day.clone())
          })?;
        let week = MonthlyWeek::from_str(&spec.monthly_week)
          .map_err(|_| {
          CompileError::UnknownWeekOrdinal(
            spec.monthly_week.clone(),
          )
        })?;
        let day_of_week = match week {
          MonthlyWeek::First => format!("{day}#1"),
          MonthlyWeek::Second => format!("{day}#2"),
          MonthlyWeek::Third => format!("{day}#3"),
          MonthlyWeek::Fourth => format!("{day}#4"),
          MonthlyWeek::Last => format!("{day}L"),
        };
        Ok(format!("0 0 0 * * {day_of_week}"))
      }
      None => Err(CompileError::MissingMonthlyType),
    },
  }
}

/// Cron day of week numbering: Sunday = 0 through Saturday = 6.
fn cron_day_of_week(day: DayOfWeek) -> u8 {
  match day {
    DayOfWeek::Sunday => 0,
    DayOfWeek::Monday => 1,
    DayOfWeek::Tuesday => 2,
    DayOfWeek::Wednesday => 3,
    DayOfWeek::Thursday => 4,
    DayOfWeek::Friday => 5,
    DayOfWeek::Saturday => 6,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn weekly(days: &[&str]) -> RecurrenceSpec {
    RecurrenceSpec {
      frequency: Frequency::Weekly,
      selected_days: days.iter().map(|d| d.to_string()).collect(),
      ..Default::default()
    }
  }

  fn monthly_date(date: u32) -> RecurrenceSpec {
    RecurrenceSpec {
      frequency: Frequency::Monthly,
      monthly_type: Some(MonthlyType::Date),
      monthly_date: date,
      ..Default::default()
    }
  }

  fn monthly_day(day: &str, week: &str) -> RecurrenceSpec {
    RecurrenceSpec {
      frequency: Frequency::Monthly,
      monthly_type: Some(MonthlyType::Day),
      monthly_day: day.to_string(),
      monthly_week: week.to_string(),
      ..Default::default()
    }
  }

  /// Every compiled expression must be accepted by the dispatcher's
  /// cron dialect.
  fn assert_parses(expression: &str) {
    croner::parser::CronParser::builder()
      .seconds(croner::parser::Seconds::Optional)
      .dom_and_dow(true)
      .build()
      .parse(expression)
      .unwrap_or_else(|e| {
        panic!("`{expression}` does not parse | {e}")
      });
  }

  #[test]
  fn daily_compiles_to_midnight_every_day() {
    let expression = compile(&RecurrenceSpec {
      frequency: Frequency::Daily,
      ..Default::default()
    })
    .unwrap();
    assert_eq!(expression, "0 0 0 * * *");
    assert_parses(&expression);
  }

  #[test]
  fn weekly_with_no_days_fails() {
    assert_eq!(
      compile(&weekly(&[])),
      Err(CompileError::NoRecognizedDays)
    );
  }

  #[test]
  fn weekly_is_order_independent() {
    let a = compile(&weekly(&["Monday", "Friday"])).unwrap();
    let b = compile(&weekly(&["Friday", "Monday"])).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, "0 0 0 * * 1,5");
    assert_parses(&a);
  }

  #[test]
  fn weekly_dedups_repeated_days() {
    let expression =
      compile(&weekly(&["Sunday", "sunday", "Sun"])).unwrap();
    assert_eq!(expression, "0 0 0 * * 0");
  }

  #[test]
  fn weekly_drops_unrecognized_days() {
    let expression =
      compile(&weekly(&["Monday", "Funday"])).unwrap();
    assert_eq!(expression, "0 0 0 * * 1");
  }

  #[test]
  fn weekly_with_only_unrecognized_days_fails() {
    assert_eq!(
      compile(&weekly(&["Funday", "Blursday"])),
      Err(CompileError::NoRecognizedDays)
    );
  }

  #[test]
  fn monthly_on_the_31st_compiles() {
    // Feasibility is not validated: months without a 31st skip.
    let expression = compile(&monthly_date(31)).unwrap();
    assert_eq!(expression, "0 0 0 31 * *");
    assert_parses(&expression);
  }

  #[test]
  fn monthly_date_zero_fails() {
    assert_eq!(
      compile(&monthly_date(0)),
      Err(CompileError::DayOfMonthOutOfRange)
    );
  }

  #[test]
  fn monthly_second_wednesday() {
    let expression =
      compile(&monthly_day("Wednesday", "second")).unwrap();
    assert_eq!(expression, "0 0 0 * * 3#2");
    assert_parses(&expression);
  }

  #[test]
  fn monthly_last_friday() {
    let expression =
      compile(&monthly_day("Friday", "last")).unwrap();
    assert_eq!(expression, "0 0 0 * * 5L");
    assert_parses(&expression);
  }

  #[test]
  fn monthly_unknown_weekday_fails() {
    assert_eq!(
      compile(&monthly_day("Caturday", "first")),
      Err(CompileError::UnknownWeekday(String::from("Caturday")))
    );
  }

  #[test]
  fn monthly_unknown_ordinal_fails() {
    assert_eq!(
      compile(&monthly_day("Friday", "fifth")),
      Err(CompileError::UnknownWeekOrdinal(String::from("fifth")))
    );
  }

  #[test]
  fn monthly_missing_type_fails() {
    assert_eq!(
      compile(&RecurrenceSpec {
        frequency: Frequency::Monthly,
        ..Default::default()
      }),
      Err(CompileError::MissingMonthlyType)
    );
  }
}
