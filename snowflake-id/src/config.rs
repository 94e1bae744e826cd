use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SnowflakeError;
use crate::layout::{DEFAULT_EPOCH, MAX_DATACENTER_ID, MAX_EPOCH, MAX_WORKER_ID, SEQUENCE_MASK};

pub const WORKER_ID_ENV: &str = "SNOWFLAKE_WORKER_ID";
pub const DATACENTER_ID_ENV: &str = "SNOWFLAKE_DATACENTER_ID";
pub const EPOCH_ENV: &str = "SNOWFLAKE_EPOCH";

/// How the generator waits for the next millisecond once 4096 ids were issued in the current
/// one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitStrategy {
  /// Poll the clock in a tight loop.
  Spin,
  /// Give up the time slice between polls.
  #[default]
  Yield,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnowflakeConfig {
  pub worker_id: i64,
  pub datacenter_id: i64,
  #[serde(default)]
  pub initial_sequence: i64,
  /// Milliseconds since the Unix epoch. Default is [DEFAULT_EPOCH].
  #[serde(default = "default_epoch")]
  pub epoch: u64,
  #[serde(default)]
  pub wait_strategy: WaitStrategy,
  /// Give up waiting for the next millisecond after this many milliseconds. Default is [None],
  /// which waits until the clock advances.
  #[serde(default)]
  pub wait_timeout_ms: Option<u64>,
}

fn default_epoch() -> u64 {
  DEFAULT_EPOCH
}

impl Default for SnowflakeConfig {
  fn default() -> Self {
    Self {
      worker_id: 0,
      datacenter_id: 0,
      initial_sequence: 0,
      epoch: DEFAULT_EPOCH,
      wait_strategy: WaitStrategy::default(),
      wait_timeout_ms: None,
    }
  }
}

impl SnowflakeConfig {
  pub fn new(worker_id: i64, datacenter_id: i64) -> Self {
    Self {
      worker_id,
      datacenter_id,
      ..Default::default()
    }
  }

  pub fn worker_id(mut self, worker_id: i64) -> Self {
    self.worker_id = worker_id;
    self
  }

  pub fn datacenter_id(mut self, datacenter_id: i64) -> Self {
    self.datacenter_id = datacenter_id;
    self
  }

  pub fn initial_sequence(mut self, initial_sequence: i64) -> Self {
    self.initial_sequence = initial_sequence;
    self
  }

  pub fn epoch(mut self, epoch: u64) -> Self {
    self.epoch = epoch;
    self
  }

  pub fn wait_strategy(mut self, wait_strategy: WaitStrategy) -> Self {
    self.wait_strategy = wait_strategy;
    self
  }

  /// Rounded up to whole milliseconds, never below 1ms.
  pub fn wait_timeout(mut self, timeout: Duration) -> Self {
    let millis = timeout.as_nanos().div_ceil(1_000_000).max(1);
    self.wait_timeout_ms = Some(u64::try_from(millis).unwrap_or(u64::MAX));
    self
  }

  pub fn wait_timeout_duration(&self) -> Option<Duration> {
    self.wait_timeout_ms.map(Duration::from_millis)
  }

  pub fn validate(&self) -> Result<(), SnowflakeError> {
    check_identity("worker_id", self.worker_id, MAX_WORKER_ID)?;
    check_identity("datacenter_id", self.datacenter_id, MAX_DATACENTER_ID)?;
    if self.initial_sequence < 0 || (self.initial_sequence as u64) > SEQUENCE_MASK {
      return Err(SnowflakeError::InvalidSequence(self.initial_sequence));
    }
    if self.epoch > MAX_EPOCH {
      return Err(SnowflakeError::InvalidConfig(format!(
        "epoch {} is larger than {}",
        self.epoch, MAX_EPOCH
      )));
    }
    Ok(())
  }

  /// Reads [WORKER_ID_ENV], [DATACENTER_ID_ENV] and [EPOCH_ENV]. Unset variables keep their
  /// defaults.
  pub fn from_env() -> Result<Self, SnowflakeError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, SnowflakeError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let mut config = Self::default();
    if let Some(value) = lookup(WORKER_ID_ENV) {
      config.worker_id = parse_var(WORKER_ID_ENV, &value)?;
    }
    if let Some(value) = lookup(DATACENTER_ID_ENV) {
      config.datacenter_id = parse_var(DATACENTER_ID_ENV, &value)?;
    }
    if let Some(value) = lookup(EPOCH_ENV) {
      config.epoch = parse_var(EPOCH_ENV, &value)?;
    }
    config.validate()?;
    Ok(config)
  }
}

impl FromStr for SnowflakeConfig {
  type Err = SnowflakeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let config: SnowflakeConfig = serde_json::from_str(s)?;
    config.validate()?;
    Ok(config)
  }
}

pub(crate) fn check_identity(field: &'static str, value: i64, max: u64) -> Result<(), SnowflakeError> {
  if value < 0 || (value as u64) > max {
    return Err(SnowflakeError::InvalidIdentity { field, value });
  }
  Ok(())
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, SnowflakeError>
where
  T::Err: std::fmt::Display,
{
  value
    .trim()
    .parse::<T>()
    .map_err(|err| SnowflakeError::InvalidConfig(format!("{}={}: {}", key, value, err)))
}
