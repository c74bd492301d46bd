use std::sync::Arc;

use anyhow::{Context, anyhow};
use async_timing_util::wait_until_timelength;
use chrono::DateTime;
use futures::{StreamExt, stream::FuturesUnordered};
use osprey_client::entities::scan::{Scan, ScanStatus};
use tokio_util::sync::CancellationToken;

use crate::{
  config::core_config, db::Store, pricing::PricingClient,
};

const MAX_RECONCILE_BATCH: usize = 100;

/// Prices finished scans once their VM lifetime is known.
///
/// Runs on its own interval, independent of the trigger dispatcher.
/// A record which cannot be priced yet is picked up again on a
/// later pass; no single record can abort a pass, and no pass can
/// abort the ones after it.
#[derive(Clone)]
pub struct CostReconciler {
  store: Arc<dyn Store>,
  pricing: Arc<dyn PricingClient>,
  cancel: CancellationToken,
}

impl CostReconciler {
  pub fn new(
    store: Arc<dyn Store>,
    pricing: Arc<dyn PricingClient>,
  ) -> CostReconciler {
    CostReconciler {
      store,
      pricing,
      cancel: CancellationToken::new(),
    }
  }

  /// Spawns the reconcile loop on the configured interval
  /// (default hourly). Clones share one cancellation token, so
  /// [stop][CostReconciler::stop] on any of them ends the loop.
  pub fn spawn(&self) {
    let reconciler = self.clone();
    tokio::spawn(async move {
      let interval = match core_config()
        .cost_reconcile_interval
        .try_into()
      {
        Ok(interval) => interval,
        Err(e) => {
          error!(
            "invalid cost reconcile interval, reconciler disabled | {e:#}"
          );
          return;
        }
      };
      loop {
        tokio::select! {
          _ = reconciler.cancel.cancelled() => break,
          _ = wait_until_timelength(interval, 500) => {}
        }
        reconciler.reconcile().await;
      }
    });
  }

  /// Stops the loop after any pass already in progress.
  pub fn stop(&self) {
    self.cancel.cancel();
  }

  /// One reconciliation pass over a bounded batch of
  /// completed but uncosted scans.
  #[instrument(name = "CostReconcile", skip(self))]
  pub async fn reconcile(&self) {
    let scans = match self
      .store
      .list_uncosted_scans(MAX_RECONCILE_BATCH)
      .await
    {
      Ok(scans) => scans,
      Err(e) => {
        error!("failed to list uncosted scans | {e:#}");
        return;
      }
    };
    if scans.is_empty() {
      return;
    }
    info!("reconciling cost on {} scans", scans.len());
    let mut futures = scans
      .into_iter()
      .map(|scan| async move {
        (self.reconcile_scan(&scan).await, scan)
      })
      .collect::<FuturesUnordered<_>>();
    while let Some((res, scan)) = futures.next().await {
      if let Err(e) = res {
        warn!(
          "failed to reconcile cost for scan {} ({}) | {e:#}",
          scan.name, scan.id
        );
      }
    }
  }

  async fn reconcile_scan(&self, scan: &Scan) -> anyhow::Result<()> {
    // Cost is computed at most once. The query already excludes
    // these, re-check before touching the record anyway.
    if scan.cost.is_some() || scan.status == ScanStatus::Manual {
      return Ok(());
    }
    let hours =
      billable_hours(&scan.vm_start_time, &scan.vm_stop_time)?;
    let provider = self
      .store
      .get_provider(&scan.vm_provider_id)
      .await?
      .with_context(|| {
        format!("no vm provider {}", scan.vm_provider_id)
      })?;
    provider
      .config
      .validate()
      .context("invalid vm provider config")?;
    let size = if scan.vm_size.is_empty() {
      provider.config.default_size.clone()
    } else {
      scan.vm_size.clone()
    };
    let price = self
      .pricing
      .hourly_price(&provider, &provider.config.region, &size)
      .await
      .context("pricing lookup failed")?
      .with_context(|| {
        format!(
          "no price for size {size} in region {}",
          provider.config.region
        )
      })?;
    let mut scan = scan.clone();
    scan.cost = Some(price * hours as f64);
    self
      .store
      .update_scan(&scan)
      .await
      .context("failed to persist cost")?;
    info!(
      "scan {} ({}) cost reconciled | {hours} hours at {price}/hr",
      scan.name, scan.id
    );
    Ok(())
  }
}

/// VM lifetime rounded up to whole billable hours. A lifetime just
/// over a boundary bills the next full hour.
fn billable_hours(
  vm_start_time: &str,
  vm_stop_time: &str,
) -> anyhow::Result<i64> {
  let start = DateTime::parse_from_rfc3339(vm_start_time)
    .context("failed to parse vm start time")?;
  let stop = DateTime::parse_from_rfc3339(vm_stop_time)
    .context("failed to parse vm stop time")?;
  let elapsed = (stop - start).num_seconds();
  if elapsed <= 0 {
    return Err(anyhow!("vm stop time is not after vm start time"));
  }
  Ok((elapsed as u64).div_ceil(3600) as i64)
}
