use async_trait::async_trait;
use osprey_client::entities::{
  provider::VmProvider, scan::Scan, schedule::ScanSchedule,
};

/// The persistent entity store, owned by the management surface.
///
/// Missing entities are `Ok(None)`; store failures are errors. Every
/// access is an independent read or write on a single record, there
/// is no transaction spanning calls.
#[async_trait]
pub trait Store: Send + Sync + 'static {
  /// Every persisted scan schedule, expired ones included.
  async fn list_schedules(
    &self,
  ) -> anyhow::Result<Vec<ScanSchedule>>;

  async fn get_schedule(
    &self,
    id: &str,
  ) -> anyhow::Result<Option<ScanSchedule>>;

  async fn get_scan(&self, id: &str)
  -> anyhow::Result<Option<Scan>>;

  /// Full record replace. Last write stands.
  async fn update_scan(&self, scan: &Scan) -> anyhow::Result<()>;

  /// Scans with no cost, both vm timestamps populated, and a status
  /// other than Manual. At most `limit` records per call.
  async fn list_uncosted_scans(
    &self,
    limit: usize,
  ) -> anyhow::Result<Vec<Scan>>;

  async fn get_provider(
    &self,
    id: &str,
  ) -> anyhow::Result<Option<VmProvider>>;
}
