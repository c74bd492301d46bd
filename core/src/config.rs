use std::sync::OnceLock;

use anyhow::Context;
use osprey_client::entities::{
  config::{CoreConfig, Env},
  logger::LogConfig,
};

pub fn core_config() -> &'static CoreConfig {
  static CORE_CONFIG: OnceLock<CoreConfig> = OnceLock::new();
  CORE_CONFIG.get_or_init(|| {
    dotenvy::dotenv().ok();
    let env: Env = match envy::from_env()
      .context("Failed to parse Osprey Core environment")
    {
      Ok(env) => env,
      Err(e) => {
        panic!("{e:?}");
      }
    };
    let config = match &env.osprey_config_path {
      Some(path) => {
        let contents = std::fs::read_to_string(path)
          .unwrap_or_else(|e| {
            panic!(
              "Failed to read core config at {} | {e:?}",
              path.display()
            )
          });
        toml::from_str(&contents).unwrap_or_else(|e| {
          panic!("Failed to parse core config toml | {e:?}")
        })
      }
      None => CoreConfig::default(),
    };

    // recreating CoreConfig here makes sure all env overrides are applied.
    CoreConfig {
      timezone: env.osprey_timezone.unwrap_or(config.timezone),
      cost_reconcile_interval: env
        .osprey_cost_reconcile_interval
        .unwrap_or(config.cost_reconcile_interval),
      playbook_path: env
        .osprey_playbook_path
        .unwrap_or(config.playbook_path),
      inventory_path: env
        .osprey_inventory_path
        .unwrap_or(config.inventory_path),
      scan_definitions_path: env
        .osprey_scan_definitions_path
        .unwrap_or(config.scan_definitions_path),
      base_path: env.osprey_base_path.unwrap_or(config.base_path),
      scan_log_directory: env
        .osprey_scan_log_directory
        .unwrap_or(config.scan_log_directory),
      logging: LogConfig {
        level: env
          .osprey_logging_level
          .unwrap_or(config.logging.level),
        stdio: env
          .osprey_logging_stdio
          .unwrap_or(config.logging.stdio),
        pretty: env
          .osprey_logging_pretty
          .unwrap_or(config.logging.pretty),
        otlp_endpoint: env
          .osprey_logging_otlp_endpoint
          .unwrap_or(config.logging.otlp_endpoint),
        opentelemetry_service_name: env
          .osprey_logging_opentelemetry_service_name
          .unwrap_or(config.logging.opentelemetry_service_name),
      },
    }
  })
}
