use std::path::PathBuf;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use osprey_client::entities::config::CoreConfig;
use run_command::async_run_command;

/// Everything one provisioning run needs to stand up scan
/// infrastructure.
#[derive(Debug, Clone)]
pub struct ProvisionArgs {
  pub playbook: PathBuf,
  pub log_directory: PathBuf,
  pub scan_definition: PathBuf,
  pub inventory: PathBuf,
  pub base_path: PathBuf,
  pub scan_id: String,
}

impl ProvisionArgs {
  pub fn for_scan(
    config: &CoreConfig,
    scan_id: impl Into<String>,
  ) -> ProvisionArgs {
    ProvisionArgs {
      playbook: config.playbook_path.clone(),
      log_directory: config.scan_log_directory.clone(),
      scan_definition: config.scan_definitions_path.clone(),
      inventory: config.inventory_path.clone(),
      base_path: config.base_path.clone(),
      scan_id: scan_id.into(),
    }
  }
}

/// The external infrastructure automation. Synchronous from the
/// caller's perspective: `execute` returns once the run has passed
/// or failed. Any further log streaming is the collaborator's own
/// concern.
#[async_trait]
pub trait Provisioner: Send + Sync + 'static {
  async fn execute(&self, args: &ProvisionArgs)
  -> anyhow::Result<()>;
}

/// Runs the deploy playbook with `ansible-playbook`, capturing the
/// run output into a per scan log file under the log directory.
#[derive(Debug, Default)]
pub struct AnsiblePlaybook;

#[async_trait]
impl Provisioner for AnsiblePlaybook {
  async fn execute(
    &self,
    args: &ProvisionArgs,
  ) -> anyhow::Result<()> {
    let command = format!(
      "cd {} && ansible-playbook {} -i {} -e scan_id={} -e scan_definition={}",
      args.base_path.display(),
      args.playbook.display(),
      args.inventory.display(),
      args.scan_id,
      args.scan_definition.display(),
    );
    let output = async_run_command(&command).await;
    if let Err(e) =
      write_run_log(args, &output.stdout, &output.stderr).await
    {
      warn!(
        "failed to write provision log for scan {} | {e:#}",
        args.scan_id
      );
    }
    if output.success() {
      Ok(())
    } else {
      Err(anyhow!(
        "ansible-playbook failed for scan {} | {}",
        args.scan_id,
        output.stderr.trim()
      ))
    }
  }
}

async fn write_run_log(
  args: &ProvisionArgs,
  stdout: &str,
  stderr: &str,
) -> anyhow::Result<()> {
  tokio::fs::create_dir_all(&args.log_directory)
    .await
    .context("failed to create scan log directory")?;
  let path = args
    .log_directory
    .join(format!("scan-{}.log", args.scan_id));
  tokio::fs::write(&path, format!("{stdout}\n{stderr}"))
    .await
    .with_context(|| {
      format!("failed to write {}", path.display())
    })?;
  Ok(())
}
