use serde::{Deserialize, Serialize};
use strum::Display;
use typeshare::typeshare;

use crate::busy::Busy;

/// Deployment lifecycle state of a scan.
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
  Display,
)]
pub enum ScanStatus {
  /// No infrastructure deployed.
  #[default]
  Idle,
  /// A trigger firing is standing up scan infrastructure.
  Deploying,
  /// Infrastructure is up and the scan is in progress.
  Running,
  /// The most recent deployment attempt failed.
  Failed,
  /// Stopped by an external flow.
  Stopped,
  /// Infrastructure managed by hand. Excluded from cost reconciliation.
  Manual,
}

/// A security scan. Owned by the management surface,
/// mutated here by trigger firings and the cost reconciler.
#[typeshare]
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Scan {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub client_id: String,
  #[serde(default)]
  pub status: ScanStatus,
  /// RFC 3339. Set when a firing moves the scan into Deploying.
  #[serde(default)]
  pub start_time: String,
  /// RFC 3339. VM lifetime bounds, populated by the scan runtime
  /// after the scan completes.
  #[serde(default)]
  pub vm_start_time: String,
  /// RFC 3339.
  #[serde(default)]
  pub vm_stop_time: String,
  /// The [VmProvider][super::provider::VmProvider] the scan deploys on.
  #[serde(default)]
  pub vm_provider_id: String,
  /// Provider size slug. Empty falls back to the provider default.
  #[serde(default)]
  pub vm_size: String,
  /// Reconciled cost in USD. Computed at most once per completed scan.
  #[serde(default)]
  pub cost: Option<f64>,
  #[serde(default)]
  pub total_targets: i64,
}

/// In flight operations on a scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanActionState {
  /// A trigger firing is currently deploying this scan.
  pub deploying: bool,
}

impl Busy for ScanActionState {
  fn busy(&self) -> bool {
    self.deploying
  }
}
