use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

/// Source of the current time in milliseconds since the Unix epoch.
///
/// The generator reads it while holding its lock, so implementations must be cheap and must
/// not block.
pub trait Clock: Send + Sync {
  fn now_millis(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
  fn now_millis(&self) -> u64 {
    (**self).now_millis()
  }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
  fn now_millis(&self) -> u64 {
    (**self).now_millis()
  }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
  fn now_millis(&self) -> u64 {
    (**self).now_millis()
  }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_millis(&self) -> u64 {
    // A system time before 1970 reads as 0 and is rejected later as being before the epoch.
    SystemTime::now()
      .duration_since(SystemTime::UNIX_EPOCH)
      .map(duration_to_millis)
      .unwrap_or(0)
  }
}

fn duration_to_millis(duration: Duration) -> u64 {
  u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
  now: AtomicU64,
}

impl ManualClock {
  pub fn new(now: u64) -> Self {
    Self {
      now: AtomicU64::new(now),
    }
  }

  pub fn set(&self, now: u64) {
    self.now.store(now, Ordering::SeqCst);
  }

  pub fn advance(&self, millis: u64) {
    self.now.fetch_add(millis, Ordering::SeqCst);
  }
}

impl Clock for ManualClock {
  fn now_millis(&self) -> u64 {
    self.now.load(Ordering::SeqCst)
  }
}

/// Replays `readings` one per call, then keeps returning the last one.
#[derive(Debug)]
pub struct ScriptedClock {
  inner: Mutex<ScriptedClockInner>,
}

#[derive(Debug)]
struct ScriptedClockInner {
  readings: VecDeque<u64>,
  last: u64,
  reads: usize,
}

impl ScriptedClock {
  pub fn new<I: IntoIterator<Item = u64>>(readings: I) -> Self {
    Self {
      inner: Mutex::new(ScriptedClockInner {
        readings: readings.into_iter().collect(),
        last: 0,
        reads: 0,
      }),
    }
  }

  /// Number of times the clock has been read.
  pub fn reads(&self) -> usize {
    self.inner.lock().reads
  }

  pub fn remaining(&self) -> usize {
    self.inner.lock().readings.len()
  }
}

impl Clock for ScriptedClock {
  fn now_millis(&self) -> u64 {
    let mut inner = self.inner.lock();
    inner.reads += 1;
    if let Some(next) = inner.readings.pop_front() {
      inner.last = next;
    }
    inner.last
  }
}
