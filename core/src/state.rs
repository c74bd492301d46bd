use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use anyhow::anyhow;
use osprey_client::{busy::Busy, entities::scan::ScanActionState};
use tokio::sync::RwLock;

/// Process lifetime cache of per scan action states.
#[derive(Default)]
pub struct ActionStates {
  pub scan: Cache<Arc<ActionState<ScanActionState>>>,
}

#[derive(Default)]
pub struct Cache<T: Clone + Default>(RwLock<HashMap<String, T>>);

impl<T: Clone + Default> Cache<T> {
  pub async fn get(&self, key: &str) -> Option<T> {
    self.0.read().await.get(key).cloned()
  }

  pub async fn get_or_insert_default(&self, key: &str) -> T {
    if let Some(item) = self.get(key).await {
      return item;
    }
    let mut lock = self.0.write().await;
    lock.entry(key.to_string()).or_default().clone()
  }
}

/// Need to be able to check "busy" with the lock acquired.
#[derive(Default)]
pub struct ActionState<States: Default + Send + 'static>(
  Mutex<States>,
);

impl<States: Default + Busy + Copy + Send + 'static>
  ActionState<States>
{
  pub fn get(&self) -> anyhow::Result<States> {
    Ok(
      *self
        .0
        .lock()
        .map_err(|e| anyhow!("action state lock poisoned | {e:?}"))?,
    )
  }

  pub fn busy(&self) -> anyhow::Result<bool> {
    Ok(self.get()?.busy())
  }

  /// Acquires the lock, checks busy, and if free runs the provided
  /// update function on the states. The returned guard resets the
  /// states to default (not busy) when dropped.
  pub fn update(
    &self,
    update_fn: impl Fn(&mut States),
  ) -> anyhow::Result<UpdateGuard<'_, States>> {
    let mut lock = self
      .0
      .lock()
      .map_err(|e| anyhow!("action state lock poisoned | {e:?}"))?;
    if lock.busy() {
      return Err(anyhow!("scan is busy"));
    }
    update_fn(&mut lock);
    Ok(UpdateGuard(&self.0))
  }
}

/// When dropped will return the inner state to default.
/// The inner mutex guard is always dropped before the UpdateGuard
/// reaches user code, so this cannot deadlock.
pub struct UpdateGuard<'a, States: Default + Send + 'static>(
  &'a Mutex<States>,
);

impl<States: Default + Send + 'static> Drop
  for UpdateGuard<'_, States>
{
  fn drop(&mut self) {
    match self.0.lock() {
      Ok(mut lock) => *lock = Default::default(),
      Err(e) => {
        error!("CRITICAL: an action state lock is poisoned | {e:?}")
      }
    }
  }
}
