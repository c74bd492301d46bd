use std::str::FromStr;

use anyhow::Context;
use async_timing_util::unix_timestamp_ms;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use typeshare::typeshare;

/// [CoreConfig][config::CoreConfig] and its [Env][config::Env] overrides.
pub mod config;
/// Subtypes of [LogConfig][logger::LogConfig].
pub mod logger;
/// Subtypes of [VmProvider][provider::VmProvider].
pub mod provider;
/// Subtypes of [Scan][scan::Scan].
pub mod scan;
/// Subtypes of [ScanSchedule][schedule::ScanSchedule].
pub mod schedule;

/// Unix timestamp in milliseconds as i64
pub fn osprey_timestamp() -> i64 {
  unix_timestamp_ms() as i64
}

#[typeshare]
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Timelength {
  /// `1-sec`
  #[serde(rename = "1-sec")]
  #[strum(serialize = "1-sec")]
  OneSecond,
  /// `5-sec`
  #[serde(rename = "5-sec")]
  #[strum(serialize = "5-sec")]
  FiveSeconds,
  /// `30-sec`
  #[serde(rename = "30-sec")]
  #[strum(serialize = "30-sec")]
  ThirtySeconds,
  /// `1-min`
  #[serde(rename = "1-min")]
  #[strum(serialize = "1-min")]
  OneMinute,
  /// `5-min`
  #[serde(rename = "5-min")]
  #[strum(serialize = "5-min")]
  FiveMinutes,
  /// `15-min`
  #[serde(rename = "15-min")]
  #[strum(serialize = "15-min")]
  FifteenMinutes,
  /// `30-min`
  #[serde(rename = "30-min")]
  #[strum(serialize = "30-min")]
  ThirtyMinutes,
  #[default]
  /// `1-hr`
  #[serde(rename = "1-hr")]
  #[strum(serialize = "1-hr")]
  OneHour,
  /// `6-hr`
  #[serde(rename = "6-hr")]
  #[strum(serialize = "6-hr")]
  SixHours,
  /// `12-hr`
  #[serde(rename = "12-hr")]
  #[strum(serialize = "12-hr")]
  TwelveHours,
  /// `1-day`
  #[serde(rename = "1-day")]
  #[strum(serialize = "1-day")]
  OneDay,
}

impl TryInto<async_timing_util::Timelength> for Timelength {
  type Error = anyhow::Error;
  fn try_into(
    self,
  ) -> Result<async_timing_util::Timelength, Self::Error> {
    async_timing_util::Timelength::from_str(&self.to_string())
      .context("failed to parse timelength?")
  }
}

/// Days of the week
#[typeshare]
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  EnumString,
  Serialize,
  Deserialize,
)]
pub enum DayOfWeek {
  #[default]
  #[serde(alias = "monday", alias = "Mon", alias = "mon")]
  #[strum(
    serialize = "Monday",
    serialize = "monday",
    serialize = "Mon",
    serialize = "mon"
  )]
  Monday,
  #[serde(alias = "tuesday", alias = "Tue", alias = "tue")]
  #[strum(
    serialize = "Tuesday",
    serialize = "tuesday",
    serialize = "Tue",
    serialize = "tue"
  )]
  Tuesday,
  #[serde(alias = "wednesday", alias = "Wed", alias = "wed")]
  #[strum(
    serialize = "Wednesday",
    serialize = "wednesday",
    serialize = "Wed",
    serialize = "wed"
  )]
  Wednesday,
  #[serde(alias = "thursday", alias = "Thurs", alias = "thurs")]
  #[strum(
    serialize = "Thursday",
    serialize = "thursday",
    serialize = "Thurs",
    serialize = "thurs"
  )]
  Thursday,
  #[serde(alias = "friday", alias = "Fri", alias = "fri")]
  #[strum(
    serialize = "Friday",
    serialize = "friday",
    serialize = "Fri",
    serialize = "fri"
  )]
  Friday,
  #[serde(alias = "saturday", alias = "Sat", alias = "sat")]
  #[strum(
    serialize = "Saturday",
    serialize = "saturday",
    serialize = "Sat",
    serialize = "sat"
  )]
  Saturday,
  #[serde(alias = "sunday", alias = "Sun", alias = "sun")]
  #[strum(
    serialize = "Sunday",
    serialize = "sunday",
    serialize = "Sun",
    serialize = "sun"
  )]
  Sunday,
}
