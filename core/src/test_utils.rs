//! In memory collaborator fakes shared by the engine's tests.

use std::{
  collections::{HashMap, HashSet},
  sync::{
    Mutex,
    atomic::{AtomicBool, Ordering},
  },
};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use osprey_client::entities::{
  osprey_timestamp,
  provider::{VmProvider, VmProviderConfig},
  scan::{Scan, ScanStatus},
  schedule::ScanSchedule,
};
use tokio::sync::Notify;

use crate::{
  db::Store,
  pricing::PricingClient,
  provision::{ProvisionArgs, Provisioner},
};

pub fn scan(id: &str) -> Scan {
  Scan {
    id: id.to_string(),
    name: id.to_string(),
    ..Default::default()
  }
}

pub fn schedule(
  id: &str,
  scan_id: &str,
  cron_expression: &str,
) -> ScanSchedule {
  ScanSchedule {
    id: id.to_string(),
    scan_id: scan_id.to_string(),
    cron_expression: cron_expression.to_string(),
    created_at: osprey_timestamp(),
    ..Default::default()
  }
}

pub fn provider(
  id: &str,
  region: &str,
  default_size: &str,
) -> VmProvider {
  VmProvider {
    id: id.to_string(),
    name: id.to_string(),
    config: VmProviderConfig {
      region: region.to_string(),
      default_size: default_size.to_string(),
    },
  }
}

pub fn past_rfc3339() -> String {
  (Utc::now() - Duration::hours(24)).to_rfc3339()
}

/// A (vm_start_time, vm_stop_time) pair `minutes` apart,
/// ending well in the past.
pub fn vm_lifetime(minutes: i64) -> (String, String) {
  let start = Utc::now() - Duration::days(2);
  (
    start.to_rfc3339(),
    (start + Duration::minutes(minutes)).to_rfc3339(),
  )
}

/// [Store] over hash maps, recording every scan write.
#[derive(Default)]
pub struct MemoryStore {
  schedules: Mutex<HashMap<String, ScanSchedule>>,
  scans: Mutex<HashMap<String, Scan>>,
  providers: Mutex<HashMap<String, VmProvider>>,
  scan_writes: Mutex<Vec<Scan>>,
  fail_writes: AtomicBool,
  fail_reads: AtomicBool,
}

impl MemoryStore {
  pub fn insert_schedule(&self, schedule: ScanSchedule) {
    self
      .schedules
      .lock()
      .unwrap()
      .insert(schedule.id.clone(), schedule);
  }

  pub fn insert_scan(&self, scan: Scan) {
    self.scans.lock().unwrap().insert(scan.id.clone(), scan);
  }

  pub fn insert_provider(&self, provider: VmProvider) {
    self
      .providers
      .lock()
      .unwrap()
      .insert(provider.id.clone(), provider);
  }

  pub fn scan(&self, id: &str) -> Option<Scan> {
    self.scans.lock().unwrap().get(id).cloned()
  }

  /// Every scan write, in order.
  pub fn scan_writes(&self) -> Vec<Scan> {
    self.scan_writes.lock().unwrap().clone()
  }

  /// The status sequence written for one scan.
  pub fn statuses_written(&self, id: &str) -> Vec<ScanStatus> {
    self
      .scan_writes()
      .into_iter()
      .filter(|scan| scan.id == id)
      .map(|scan| scan.status)
      .collect()
  }

  pub fn fail_writes(&self, fail: bool) {
    self.fail_writes.store(fail, Ordering::SeqCst);
  }

  pub fn fail_reads(&self, fail: bool) {
    self.fail_reads.store(fail, Ordering::SeqCst);
  }

  fn check_reads(&self) -> anyhow::Result<()> {
    if self.fail_reads.load(Ordering::SeqCst) {
      return Err(anyhow!("store is down"));
    }
    Ok(())
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn list_schedules(
    &self,
  ) -> anyhow::Result<Vec<ScanSchedule>> {
    self.check_reads()?;
    Ok(self.schedules.lock().unwrap().values().cloned().collect())
  }

  async fn get_schedule(
    &self,
    id: &str,
  ) -> anyhow::Result<Option<ScanSchedule>> {
    self.check_reads()?;
    Ok(self.schedules.lock().unwrap().get(id).cloned())
  }

  async fn get_scan(
    &self,
    id: &str,
  ) -> anyhow::Result<Option<Scan>> {
    self.check_reads()?;
    Ok(self.scan(id))
  }

  async fn update_scan(&self, scan: &Scan) -> anyhow::Result<()> {
    if self.fail_writes.load(Ordering::SeqCst) {
      return Err(anyhow!("store rejected the write"));
    }
    self.scan_writes.lock().unwrap().push(scan.clone());
    self.insert_scan(scan.clone());
    Ok(())
  }

  async fn list_uncosted_scans(
    &self,
    limit: usize,
  ) -> anyhow::Result<Vec<Scan>> {
    self.check_reads()?;
    Ok(
      self
        .scans
        .lock()
        .unwrap()
        .values()
        .filter(|scan| {
          scan.cost.is_none()
            && !scan.vm_start_time.is_empty()
            && !scan.vm_stop_time.is_empty()
            && scan.status != ScanStatus::Manual
        })
        .take(limit)
        .cloned()
        .collect(),
    )
  }

  async fn get_provider(
    &self,
    id: &str,
  ) -> anyhow::Result<Option<VmProvider>> {
    self.check_reads()?;
    Ok(self.providers.lock().unwrap().get(id).cloned())
  }
}

/// Records provisioning calls. Individual scans can be set up to
/// fail, or to block until [release][FakeProvisioner::release].
#[derive(Default)]
pub struct FakeProvisioner {
  calls: Mutex<Vec<String>>,
  failing: Mutex<HashSet<String>>,
  held: Mutex<HashSet<String>>,
  released: Notify,
}

impl FakeProvisioner {
  pub fn new() -> FakeProvisioner {
    Default::default()
  }

  /// Scan ids provisioning was invoked for, in call order.
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  pub fn fail_scan(&self, id: &str) {
    self.failing.lock().unwrap().insert(id.to_string());
  }

  pub fn hold_scan(&self, id: &str) {
    self.held.lock().unwrap().insert(id.to_string());
  }

  /// Unblocks every held call.
  pub fn release(&self) {
    self.held.lock().unwrap().clear();
    self.released.notify_waiters();
  }
}

#[async_trait]
impl Provisioner for FakeProvisioner {
  async fn execute(
    &self,
    args: &ProvisionArgs,
  ) -> anyhow::Result<()> {
    self.calls.lock().unwrap().push(args.scan_id.clone());
    loop {
      let released = self.released.notified();
      let held =
        self.held.lock().unwrap().contains(&args.scan_id);
      if !held {
        break;
      }
      released.await;
    }
    if self.failing.lock().unwrap().contains(&args.scan_id) {
      return Err(anyhow!(
        "provisioning automation failed for scan {}",
        args.scan_id
      ));
    }
    Ok(())
  }
}

/// Fixed price table keyed by (region, size).
#[derive(Default)]
pub struct StaticPricing {
  prices: Mutex<HashMap<(String, String), f64>>,
}

impl StaticPricing {
  pub fn new() -> StaticPricing {
    Default::default()
  }

  pub fn set_price(&self, region: &str, size: &str, price: f64) {
    self
      .prices
      .lock()
      .unwrap()
      .insert((region.to_string(), size.to_string()), price);
  }
}

#[async_trait]
impl PricingClient for StaticPricing {
  async fn hourly_price(
    &self,
    _provider: &VmProvider,
    region: &str,
    size: &str,
  ) -> anyhow::Result<Option<f64>> {
    Ok(
      self
        .prices
        .lock()
        .unwrap()
        .get(&(region.to_string(), size.to_string()))
        .copied(),
    )
  }
}
