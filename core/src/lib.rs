//! The Osprey scheduling and execution lifecycle engine.
//!
//! [schedule::Scheduler] owns trigger registration and dispatch,
//! [execute::Executor] drives a fired scan through its deployment
//! states, and [cost::CostReconciler] prices finished scans on an
//! independent interval. The persistent store, the provisioning
//! automation, and the pricing catalog are collaborators behind the
//! [db::Store], [provision::Provisioner] and [pricing::PricingClient]
//! traits; the boot sequence that composes them owns the lifecycle
//! of both services.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod cost;
pub mod cron;
pub mod db;
pub mod execute;
pub mod pricing;
pub mod provision;
pub mod schedule;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use cost::CostReconciler;
pub use schedule::Scheduler;

/// Initializes tracing for the process per the core logging config.
/// Called once by the boot sequence before either service starts.
pub fn init_logging() -> anyhow::Result<()> {
  logger::init(&config::core_config().logging)
}
