use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use anyhow::{Context, anyhow};
use async_timing_util::{Timelength, wait_until_timelength};
use chrono::Local;
use osprey_client::entities::{
  osprey_timestamp, schedule::ScanSchedule,
};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::{
  config::core_config, cron, db::Store, execute::Executor,
  provision::Provisioner,
};

/// The live dispatcher entry for one registered schedule.
/// Rebuilt from the persisted schedule set on every process start.
struct TriggerHandle {
  scan_id: String,
  cron: croner::Cron,
  /// Next firing in unix ms.
  next_run: i64,
}

/// Entries which fail to compile or parse are kept with the error,
/// so the management surface can display why a schedule never fires.
type Schedules = HashMap<String, Result<TriggerHandle, String>>;

/// Owns the schedule registry and the dispatch loop.
///
/// Cron parsing and occurrence matching come from croner, driven by
/// a second resolution tick. Each due trigger fires on its own task,
/// handed to the [Executor].
pub struct Scheduler {
  store: Arc<dyn Store>,
  executor: Arc<Executor>,
  schedules: Arc<RwLock<Schedules>>,
  cancel: CancellationToken,
  running: AtomicBool,
}

impl Scheduler {
  pub fn new(
    store: Arc<dyn Store>,
    provisioner: Arc<dyn Provisioner>,
  ) -> Scheduler {
    Scheduler {
      executor: Arc::new(Executor::new(store.clone(), provisioner)),
      store,
      schedules: Default::default(),
      cancel: CancellationToken::new(),
      running: AtomicBool::new(false),
    }
  }

  /// Loads every persisted schedule into the registry,
  /// replacing all existing registrations. Calling this again is a
  /// full reload, never a double registration.
  pub async fn load_schedules(&self) {
    let schedules = match self
      .store
      .list_schedules()
      .await
      .context("failed to list scan schedules")
    {
      Ok(schedules) => schedules,
      Err(e) => {
        error!("failed to load schedules | {e:#}");
        Vec::new()
      }
    };
    self.schedules.write().await.clear();
    for schedule in &schedules {
      self.update_schedule(schedule).await;
    }
  }

  /// Re/registers a single schedule, cancelling any existing
  /// registration under its id first. Expired schedules are dropped
  /// here and never reach the dispatch loop.
  pub async fn update_schedule(&self, schedule: &ScanSchedule) {
    let mut lock = self.schedules.write().await;
    lock.remove(&schedule.id);
    if schedule_expired(schedule) {
      info!(
        "schedule {} ended {}, not registering",
        schedule.id, schedule.end_date
      );
      return;
    }
    let handle = register(schedule).map_err(|e| {
      warn!("cannot register schedule {} | {e:#}", schedule.id);
      format!("{e:#}")
    });
    lock.insert(schedule.id.clone(), handle);
  }

  /// Drops the registration for the given schedule id.
  pub async fn cancel_schedule(&self, id: &str) {
    self.schedules.write().await.remove(id);
  }

  /// Next run time in unix ms, or the registration error.
  pub async fn schedule_info(
    &self,
    id: &str,
  ) -> (Option<i64>, Option<String>) {
    match self.schedules.read().await.get(id) {
      Some(Ok(handle)) => (Some(handle.next_run), None),
      Some(Err(e)) => (None, Some(e.clone())),
      None => (None, None),
    }
  }

  /// Spawns the dispatch loop. Ticks once a second, collects due
  /// entries, and runs each firing on its own task so one slow
  /// firing cannot delay or skip another schedule's.
  pub fn start(&self) {
    if self.running.swap(true, Ordering::SeqCst) {
      warn!("scheduler dispatch loop is already running");
      return;
    }
    let executor = self.executor.clone();
    let schedules = self.schedules.clone();
    let cancel = self.cancel.clone();
    tokio::spawn(async move {
      loop {
        let current_time = tokio::select! {
          _ = cancel.cancelled() => break,
          time =
            wait_until_timelength(Timelength::OneSecond, 0) =>
          {
            time as i64
          }
        };
        tick(&executor, &schedules, current_time).await;
      }
    });
  }

  /// Stops the dispatch loop issuing new firings. Firings already
  /// in flight run to completion.
  pub fn stop(&self) {
    self.cancel.cancel();
  }
}

async fn tick(
  executor: &Arc<Executor>,
  schedules: &RwLock<Schedules>,
  current_time: i64,
) {
  let mut lock = schedules.write().await;
  for (id, entry) in lock.iter_mut() {
    let Ok(handle) = entry else {
      continue;
    };
    if current_time < handle.next_run {
      continue;
    }
    let executor = executor.clone();
    let schedule_id = id.clone();
    let scan_id = handle.scan_id.clone();
    tokio::spawn(async move {
      executor.run(&schedule_id, &scan_id).await;
    });
    // Advance before the next tick can see this entry,
    // otherwise a single match would fire every second.
    match find_next_occurrence(&handle.cron) {
      Ok(next_run) => handle.next_run = next_run,
      Err(e) => {
        warn!("failed to advance schedule {id} | {e:#}");
        *entry = Err(format!("{e:#}"));
      }
    }
  }
}

/// Whether the schedule's end date has passed. An unparseable end
/// date is logged and treated as unbounded.
pub fn schedule_expired(schedule: &ScanSchedule) -> bool {
  if schedule.end_date.is_empty() {
    return false;
  }
  match chrono::DateTime::parse_from_rfc3339(&schedule.end_date) {
    Ok(end) => end.timestamp_millis() < osprey_timestamp(),
    Err(e) => {
      warn!(
        "schedule {} has unparseable end date `{}`, treating as unbounded | {e:#}",
        schedule.id, schedule.end_date
      );
      false
    }
  }
}

fn register(
  schedule: &ScanSchedule,
) -> anyhow::Result<TriggerHandle> {
  // An explicit expression is used verbatim. Only schedules without
  // one go through the recurrence compiler.
  let expression = if !schedule.cron_expression.is_empty() {
    schedule.cron_expression.clone()
  } else if let Some(recurrence) = &schedule.recurrence {
    cron::compile(recurrence)
      .context("failed to compile recurrence")?
  } else {
    return Err(anyhow!(
      "schedule has neither a recurrence nor a cron expression"
    ));
  };
  let cron = croner::parser::CronParser::builder()
    .seconds(croner::parser::Seconds::Optional)
    .dom_and_dow(true)
    .build()
    .parse(&expression)
    .with_context(|| {
      format!("failed to parse schedule CRON: {expression}")
    })?;
  let next_run = find_next_occurrence(&cron)?;
  Ok(TriggerHandle {
    scan_id: schedule.scan_id.clone(),
    cron,
    next_run,
  })
}

/// Finds the next run occurence in UTC ms, resolved in the core
/// timezone when one is configured, the host timezone otherwise.
fn find_next_occurrence(
  cron: &croner::Cron,
) -> anyhow::Result<i64> {
  let next = match core_config().timezone.as_str() {
    "" => {
      let tz_time = chrono::Local::now().with_timezone(&Local);
      cron
        .find_next_occurrence(&tz_time, false)
        .context("failed to find next run time")?
        .timestamp_millis()
    }
    timezone => {
      let tz: chrono_tz::Tz =
        timezone.parse().context("failed to parse timezone")?;
      let tz_time = chrono::Local::now().with_timezone(&tz);
      cron
        .find_next_occurrence(&tz_time, false)
        .context("failed to find next run time")?
        .timestamp_millis()
    }
  };
  Ok(next)
}
