use async_trait::async_trait;
use osprey_client::entities::provider::VmProvider;

/// Read side of the provider pricing catalog.
#[async_trait]
pub trait PricingClient: Send + Sync + 'static {
  /// The hourly unit price for `size` in `region`, or `None` when
  /// the catalog has no matching entry.
  async fn hourly_price(
    &self,
    provider: &VmProvider,
    region: &str,
    size: &str,
  ) -> anyhow::Result<Option<f64>>;
}
