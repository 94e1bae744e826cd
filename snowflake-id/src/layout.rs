use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SnowflakeError;

/// Equivalent to November 4, 2010 1:42:54.657 AM UTC
pub const DEFAULT_EPOCH: u64 = 1288834974657;

pub const TIMESTAMP_BITS: u64 = 41;
pub const DATACENTER_ID_BITS: u64 = 5;
pub const WORKER_ID_BITS: u64 = 5;
/// 12 bits. For every ID generated by one generator, the sequence number is incremented by 1.
/// The number is reset to 0 every millisecond.
pub const SEQUENCE_BITS: u64 = 12;

pub const WORKER_ID_SHIFT: u64 = SEQUENCE_BITS;
pub const DATACENTER_ID_SHIFT: u64 = WORKER_ID_BITS + SEQUENCE_BITS;
pub const TIMESTAMP_SHIFT: u64 = DATACENTER_ID_BITS + WORKER_ID_BITS + SEQUENCE_BITS;

pub const MAX_WORKER_ID: u64 = (1 << WORKER_ID_BITS) - 1;
pub const MAX_DATACENTER_ID: u64 = (1 << DATACENTER_ID_BITS) - 1;
/// SEQUENCE_MASK is 4095 (in binary, 111111111111). Applied with `&` it keeps the least
/// significant 12 bits, which is how the sequence wraps back to 0.
pub const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
pub const MAX_ELAPSED: u64 = (1 << TIMESTAMP_BITS) - 1;
/// Largest epoch for which every 41-bit elapsed value still maps to a `u64` timestamp.
pub const MAX_EPOCH: u64 = u64::MAX - MAX_ELAPSED;

/// A 64-bit identifier:
///
/// ```text
/// | 1 bit unused | 41 bits ms since epoch | 5 bits datacenter | 5 bits worker | 12 bits sequence |
/// ```
///
/// The sign bit is never set, so ordering by `i64` and by `u64` agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SnowflakeId(i64);

impl SnowflakeId {
  pub fn as_i64(&self) -> i64 {
    self.0
  }

  pub fn as_u64(&self) -> u64 {
    self.0 as u64
  }

  pub fn elapsed(&self) -> u64 {
    (self.as_u64() >> TIMESTAMP_SHIFT) & MAX_ELAPSED
  }

  pub fn datacenter_id(&self) -> u64 {
    (self.as_u64() >> DATACENTER_ID_SHIFT) & MAX_DATACENTER_ID
  }

  pub fn worker_id(&self) -> u64 {
    (self.as_u64() >> WORKER_ID_SHIFT) & MAX_WORKER_ID
  }

  pub fn sequence(&self) -> u64 {
    self.as_u64() & SEQUENCE_MASK
  }

  /// Splits the id back into the values it was packed from. `epoch` must be the epoch of the
  /// generator that minted it. An epoch above [MAX_EPOCH] saturates the timestamp at `u64::MAX`.
  pub fn parts(&self, epoch: u64) -> SnowflakeParts {
    SnowflakeParts {
      timestamp: self.elapsed().saturating_add(epoch),
      datacenter_id: self.datacenter_id(),
      worker_id: self.worker_id(),
      sequence: self.sequence(),
    }
  }
}

impl Display for SnowflakeId {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    Display::fmt(&self.0, f)
  }
}

impl FromStr for SnowflakeId {
  type Err = SnowflakeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let value = s
      .trim()
      .parse::<i64>()
      .map_err(|err| SnowflakeError::InvalidId(format!("{}: {}", s, err)))?;
    Self::try_from(value)
  }
}

impl TryFrom<i64> for SnowflakeId {
  type Error = SnowflakeError;

  fn try_from(value: i64) -> Result<Self, Self::Error> {
    if value < 0 {
      return Err(SnowflakeError::InvalidId(format!(
        "{} has the sign bit set",
        value
      )));
    }
    Ok(Self(value))
  }
}

impl TryFrom<u64> for SnowflakeId {
  type Error = SnowflakeError;

  fn try_from(value: u64) -> Result<Self, Self::Error> {
    let value = i64::try_from(value).map_err(|_| {
      SnowflakeError::InvalidId(format!("{} has the sign bit set", value))
    })?;
    Ok(Self(value))
  }
}

impl From<SnowflakeId> for i64 {
  fn from(id: SnowflakeId) -> Self {
    id.0
  }
}

impl From<SnowflakeId> for u64 {
  fn from(id: SnowflakeId) -> Self {
    id.as_u64()
  }
}

/// The decoded form of a [SnowflakeId]. `timestamp` is milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnowflakeParts {
  pub timestamp: u64,
  pub datacenter_id: u64,
  pub worker_id: u64,
  pub sequence: u64,
}

impl SnowflakeParts {
  pub fn pack(&self, epoch: u64) -> Result<SnowflakeId, SnowflakeError> {
    if self.worker_id > MAX_WORKER_ID {
      return Err(SnowflakeError::InvalidIdentity {
        field: "worker_id",
        value: self.worker_id as i64,
      });
    }
    if self.datacenter_id > MAX_DATACENTER_ID {
      return Err(SnowflakeError::InvalidIdentity {
        field: "datacenter_id",
        value: self.datacenter_id as i64,
      });
    }
    if self.sequence > SEQUENCE_MASK {
      return Err(SnowflakeError::InvalidSequence(self.sequence as i64));
    }
    let elapsed = elapsed_since(self.timestamp, epoch)?;
    Ok(pack(elapsed, self.datacenter_id, self.worker_id, self.sequence))
  }

  /// The millisecond the id was minted in. `None` if the timestamp does not fit a `DateTime`.
  pub fn datetime(&self) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(i64::try_from(self.timestamp).ok()?)
  }
}

/// Milliseconds between `epoch` and `timestamp`, checked against the 41-bit field.
pub(crate) fn elapsed_since(timestamp: u64, epoch: u64) -> Result<u64, SnowflakeError> {
  if timestamp < epoch {
    return Err(SnowflakeError::TimestampBeforeEpoch { timestamp, epoch });
  }
  let elapsed = timestamp - epoch;
  if elapsed > MAX_ELAPSED {
    return Err(SnowflakeError::TimestampOverflow { elapsed });
  }
  Ok(elapsed)
}

/// Callers guarantee every component already fits its field.
pub(crate) fn pack(elapsed: u64, datacenter_id: u64, worker_id: u64, sequence: u64) -> SnowflakeId {
  let id = (elapsed << TIMESTAMP_SHIFT)
    | (datacenter_id << DATACENTER_ID_SHIFT)
    | (worker_id << WORKER_ID_SHIFT)
    | sequence;
  SnowflakeId(id as i64)
}
