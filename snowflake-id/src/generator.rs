use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{SnowflakeConfig, WaitStrategy};
use crate::error::SnowflakeError;
use crate::layout::{SEQUENCE_MASK, SnowflakeId, SnowflakeParts, elapsed_since, pack};

/// Mints [SnowflakeId]s for one `(worker_id, datacenter_id)` identity.
///
/// The generator is `Sync`: share it by reference or through an `Arc` and call
/// [SnowflakeGenerator::next_id] from as many threads as needed. Each call reads the clock and
/// updates `(last_timestamp, sequence)` inside one critical section, so two callers never see
/// the same state. Ids from one generator are strictly increasing as long as the clock does not
/// move backwards. When it does, [SnowflakeError::ClockRegression] is returned and nothing is
/// changed.
#[derive(Debug)]
pub struct SnowflakeGenerator<C = SystemClock> {
  worker_id: u64,
  datacenter_id: u64,
  epoch: u64,
  wait_strategy: WaitStrategy,
  wait_timeout: Option<Duration>,
  clock: C,
  state: Mutex<MintState>,
}

#[derive(Debug, Clone, Copy)]
struct MintState {
  /// [None] until the first successful mint.
  last_timestamp: Option<u64>,
  sequence: u64,
}

impl SnowflakeGenerator<SystemClock> {
  pub fn new(
    worker_id: i64,
    datacenter_id: i64,
    initial_sequence: i64,
  ) -> Result<Self, SnowflakeError> {
    let config =
      SnowflakeConfig::new(worker_id, datacenter_id).initial_sequence(initial_sequence);
    Self::from_config(config)
  }

  pub fn from_config(config: SnowflakeConfig) -> Result<Self, SnowflakeError> {
    Self::with_clock(config, SystemClock)
  }
}

impl<C: Clock> SnowflakeGenerator<C> {
  pub fn with_clock(config: SnowflakeConfig, clock: C) -> Result<Self, SnowflakeError> {
    config.validate()?;
    Ok(Self::from_validated(config, clock))
  }

  /// `config` must already have passed [SnowflakeConfig::validate].
  pub(crate) fn from_validated(config: SnowflakeConfig, clock: C) -> Self {
    debug!(
      "snowflake generator: worker_id={}, datacenter_id={}, epoch={}",
      config.worker_id, config.datacenter_id, config.epoch
    );
    Self {
      worker_id: config.worker_id as u64,
      datacenter_id: config.datacenter_id as u64,
      epoch: config.epoch,
      wait_strategy: config.wait_strategy,
      wait_timeout: config.wait_timeout_duration(),
      clock,
      state: Mutex::new(MintState {
        last_timestamp: None,
        sequence: config.initial_sequence as u64,
      }),
    }
  }

  pub fn next_id(&self) -> Result<SnowflakeId, SnowflakeError> {
    let mut state = self.state.lock();
    let mut timestamp = self.clock.now_millis();
    let mut sequence = 0;

    if let Some(last) = state.last_timestamp {
      if timestamp < last {
        warn!(
          "Clock moved backwards: last timestamp {}, now {}",
          last, timestamp
        );
        return Err(SnowflakeError::ClockRegression {
          last,
          now: timestamp,
        });
      }

      if timestamp == last {
        sequence = (state.sequence + 1) & SEQUENCE_MASK;
        if sequence == 0 {
          trace!("sequence exhausted at {}, waiting for the next millisecond", last);
          timestamp = self.wait_next_millis(last)?;
        }
      }
    }

    let elapsed = elapsed_since(timestamp, self.epoch).inspect_err(|err| {
      warn!("snowflake timestamp out of range: {}", err);
    })?;

    // Nothing above touched the state, so every error path leaves it as it was.
    state.last_timestamp = Some(timestamp);
    state.sequence = sequence;
    drop(state);

    let id = pack(elapsed, self.datacenter_id, self.worker_id, sequence);
    #[cfg(feature = "verbose_log")]
    trace!("minted snowflake id: {} at {}:{}", id, timestamp, sequence);
    Ok(id)
  }

  fn wait_next_millis(&self, last_timestamp: u64) -> Result<u64, SnowflakeError> {
    let started = Instant::now();
    loop {
      let timestamp = self.clock.now_millis();
      if timestamp > last_timestamp {
        return Ok(timestamp);
      }

      if let Some(timeout) = self.wait_timeout {
        if started.elapsed() >= timeout {
          warn!(
            "clock stuck at {} for {:?}, giving up",
            last_timestamp, timeout
          );
          return Err(SnowflakeError::WaitTimeout(timeout));
        }
      }

      match self.wait_strategy {
        WaitStrategy::Spin => std::hint::spin_loop(),
        WaitStrategy::Yield => std::thread::yield_now(),
      }
    }
  }

  /// Decodes an id minted by this generator, or by any generator sharing its epoch.
  pub fn decode(&self, id: SnowflakeId) -> SnowflakeParts {
    id.parts(self.epoch)
  }

  pub fn worker_id(&self) -> u64 {
    self.worker_id
  }

  pub fn datacenter_id(&self) -> u64 {
    self.datacenter_id
  }

  pub fn epoch(&self) -> u64 {
    self.epoch
  }

  pub fn clock(&self) -> &C {
    &self.clock
  }

  /// Timestamp of the last successful mint.
  pub fn last_timestamp(&self) -> Option<u64> {
    self.state.lock().last_timestamp
  }

  pub fn sequence(&self) -> u64 {
    self.state.lock().sequence
  }
}
