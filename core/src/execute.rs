use std::sync::Arc;

use chrono::Utc;
use osprey_client::entities::scan::ScanStatus;
use uuid::Uuid;

use crate::{
  config::core_config,
  db::Store,
  provision::{ProvisionArgs, Provisioner},
  schedule::schedule_expired,
  state::ActionStates,
};

/// Drives one trigger firing through the deployment state machine:
/// Deploying, then Running on provisioning success or Failed on
/// provisioning failure.
pub struct Executor {
  store: Arc<dyn Store>,
  provisioner: Arc<dyn Provisioner>,
  states: ActionStates,
}

impl Executor {
  pub fn new(
    store: Arc<dyn Store>,
    provisioner: Arc<dyn Provisioner>,
  ) -> Executor {
    Executor {
      store,
      provisioner,
      states: Default::default(),
    }
  }

  /// One firing. Every failure path terminates in a log line and a
  /// no-op or partial state outcome; nothing propagates back to the
  /// dispatcher.
  #[instrument(name = "ScheduledScanRun", skip(self))]
  pub async fn run(&self, schedule_id: &str, scan_id: &str) {
    let firing_id = Uuid::new_v4();
    info!(
      "schedule {schedule_id} firing {firing_id} | scan {scan_id}"
    );

    // The schedule may have been deleted or have ended between
    // registration and firing. Neither is an error.
    let schedule = match self.store.get_schedule(schedule_id).await
    {
      Ok(Some(schedule)) => schedule,
      Ok(None) => {
        info!(
          "schedule {schedule_id} deleted before firing, skipping"
        );
        return;
      }
      Err(e) => {
        warn!(
          "failed to fetch schedule {schedule_id} at firing time | {e:#}"
        );
        return;
      }
    };
    if schedule_expired(&schedule) {
      info!("schedule {schedule_id} ended before firing, skipping");
      return;
    }

    // A firing which outlives its own period must not overlap the
    // next one on the same scan. Dropping the guard frees the scan.
    let action_state =
      self.states.scan.get_or_insert_default(scan_id).await;
    let _guard =
      match action_state.update(|state| state.deploying = true) {
        Ok(guard) => guard,
        Err(_) => {
          warn!(
            "scan {scan_id} is still deploying from a previous firing, skipping"
          );
          return;
        }
      };

    let mut scan = match self.store.get_scan(scan_id).await {
      Ok(Some(scan)) => scan,
      Ok(None) => {
        warn!(
          "schedule {schedule_id} references missing scan {scan_id}"
        );
        return;
      }
      Err(e) => {
        warn!("failed to fetch scan {scan_id} | {e:#}");
        return;
      }
    };

    // Dashboards must see the in-flight state before any
    // provisioning call goes out.
    scan.status = ScanStatus::Deploying;
    scan.start_time = Utc::now().to_rfc3339();
    if let Err(e) = self.store.update_scan(&scan).await {
      warn!("failed to set scan {scan_id} Deploying | {e:#}");
      return;
    }

    let args = ProvisionArgs::for_scan(core_config(), scan_id);
    scan.status = match self.provisioner.execute(&args).await {
      Ok(()) => ScanStatus::Running,
      Err(e) => {
        // Not retried in place. A retry, if wanted, is the next
        // scheduled firing.
        warn!(
          "provisioning failed for scan {scan_id} firing {firing_id} | {e:#}"
        );
        ScanStatus::Failed
      }
    };
    if let Err(e) = self.store.update_scan(&scan).await {
      warn!(
        "failed to set scan {scan_id} {} | {e:#}",
        scan.status
      );
    }
  }
}
