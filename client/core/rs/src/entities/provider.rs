use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use typeshare::typeshare;

/// A configured VM provider account scans can deploy on.
#[typeshare]
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct VmProvider {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub config: VmProviderConfig,
}

/// Typed provider settings. Validated once at the read boundary,
/// so missing fields surface as a single error instead of failing
/// deep inside cost computation.
#[typeshare]
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct VmProviderConfig {
  /// Region scan infrastructure deploys into.
  #[serde(default)]
  pub region: String,
  /// Size slug used when a scan does not pin one.
  #[serde(default)]
  pub default_size: String,
}

impl VmProviderConfig {
  pub fn validate(&self) -> anyhow::Result<()> {
    if self.region.is_empty() {
      return Err(anyhow!("provider config has empty region"));
    }
    if self.default_size.is_empty() {
      return Err(anyhow!("provider config has empty default size"));
    }
    Ok(())
  }
}
