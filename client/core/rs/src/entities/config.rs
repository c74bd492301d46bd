//! # Configuring Osprey Core
//!
//! Osprey Core is configured by parsing a base configuration file
//! ([CoreConfig]), and overriding any fields given in the file with ones
//! provided on the environment ([Env]).

use std::path::PathBuf;

use serde::Deserialize;

use crate::entities::{
  Timelength,
  logger::{LogConfig, LogLevel, StdioLogMode},
};

/// # Osprey Core Environment Variables
///
/// Override any field of the [CoreConfig] by passing the associated
/// environment variable, in the traditional `UPPER_SNAKE_CASE` format.
#[derive(Debug, Clone, Deserialize)]
pub struct Env {
  /// Specify a custom config path for the core config toml.
  pub osprey_config_path: Option<PathBuf>,

  /// Override `timezone`
  #[serde(alias = "tz", alias = "TZ")]
  pub osprey_timezone: Option<String>,
  /// Override `cost_reconcile_interval`
  pub osprey_cost_reconcile_interval: Option<Timelength>,
  /// Override `playbook_path`
  pub osprey_playbook_path: Option<PathBuf>,
  /// Override `inventory_path`
  pub osprey_inventory_path: Option<PathBuf>,
  /// Override `scan_definitions_path`
  pub osprey_scan_definitions_path: Option<PathBuf>,
  /// Override `base_path`
  pub osprey_base_path: Option<PathBuf>,
  /// Override `scan_log_directory`
  pub osprey_scan_log_directory: Option<PathBuf>,

  /// Override `logging.level`
  pub osprey_logging_level: Option<LogLevel>,
  /// Override `logging.stdio`
  pub osprey_logging_stdio: Option<StdioLogMode>,
  /// Override `logging.pretty`
  pub osprey_logging_pretty: Option<bool>,
  /// Override `logging.otlp_endpoint`
  pub osprey_logging_otlp_endpoint: Option<String>,
  /// Override `logging.opentelemetry_service_name`
  pub osprey_logging_opentelemetry_service_name: Option<String>,
}

/// Core configuration, deserialized from the config toml
/// with [Env] overrides applied on top.
#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
  /// IANA timezone schedule firing times resolve in.
  /// Empty uses the host local timezone.
  #[serde(default)]
  pub timezone: String,

  /// Interval between cost reconciliation passes. Default: `1-hr`.
  #[serde(default)]
  pub cost_reconcile_interval: Timelength,

  /// Playbook invoked to deploy scan infrastructure.
  #[serde(default = "default_playbook_path")]
  pub playbook_path: PathBuf,

  /// Inventory passed to the playbook.
  #[serde(default = "default_inventory_path")]
  pub inventory_path: PathBuf,

  /// Scan definition file handed to the playbook.
  #[serde(default = "default_scan_definitions_path")]
  pub scan_definitions_path: PathBuf,

  /// Directory provisioning runs execute from.
  #[serde(default = "default_base_path")]
  pub base_path: PathBuf,

  /// Directory provisioning logs are written under.
  #[serde(default = "default_scan_log_directory")]
  pub scan_log_directory: PathBuf,

  /// Logging configuration
  #[serde(default)]
  pub logging: LogConfig,
}

fn default_playbook_path() -> PathBuf {
  PathBuf::from("/etc/osprey/playbooks/deploy-scan.yml")
}

fn default_inventory_path() -> PathBuf {
  PathBuf::from("/etc/osprey/inventory/hosts")
}

fn default_scan_definitions_path() -> PathBuf {
  PathBuf::from("/etc/osprey/scan-definitions.toml")
}

fn default_base_path() -> PathBuf {
  PathBuf::from("/etc/osprey")
}

fn default_scan_log_directory() -> PathBuf {
  PathBuf::from("/var/log/osprey/scans")
}

impl Default for CoreConfig {
  fn default() -> Self {
    Self {
      timezone: Default::default(),
      cost_reconcile_interval: Default::default(),
      playbook_path: default_playbook_path(),
      inventory_path: default_inventory_path(),
      scan_definitions_path: default_scan_definitions_path(),
      base_path: default_base_path(),
      scan_log_directory: default_scan_log_directory(),
      logging: Default::default(),
    }
  }
}
