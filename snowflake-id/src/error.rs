use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SnowflakeError {
  #[error("Invalid {field}: {value}, expected a value in [0, 31]")]
  InvalidIdentity { field: &'static str, value: i64 },

  #[error("Invalid sequence: {0}, expected a value in [0, 4095]")]
  InvalidSequence(i64),

  #[error("Clock moved backwards: last timestamp {last}, now {now}")]
  ClockRegression { last: u64, now: u64 },

  #[error("Timestamp {timestamp} is earlier than the epoch {epoch}")]
  TimestampBeforeEpoch { timestamp: u64, epoch: u64 },

  #[error("Timestamp exhausted: {elapsed}ms since the epoch does not fit in 41 bits")]
  TimestampOverflow { elapsed: u64 },

  #[error("Clock did not advance within {0:?}")]
  WaitTimeout(Duration),

  #[error("Invalid id: {0}")]
  InvalidId(String),

  #[error("Invalid config: {0}")]
  InvalidConfig(String),

  #[error(transparent)]
  SerdeJson(#[from] serde_json::Error),
}

impl SnowflakeError {
  /// Errors that resolve on their own once the clock catches up. The generator never retries
  /// them itself.
  pub fn is_retryable(&self) -> bool {
    matches!(
      self,
      SnowflakeError::ClockRegression { .. } | SnowflakeError::WaitTimeout(_)
    )
  }
}
