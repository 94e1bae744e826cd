use lazy_static::lazy_static;
use tracing::error;

use crate::clock::SystemClock;
use crate::config::SnowflakeConfig;
use crate::error::SnowflakeError;
use crate::generator::SnowflakeGenerator;
use crate::layout::SnowflakeId;

lazy_static! {
  static ref DEFAULT_ID_GEN: SnowflakeGenerator = default_id_gen();
}

fn default_id_gen() -> SnowflakeGenerator {
  let config = SnowflakeConfig::from_env().unwrap_or_else(|err| {
    error!(
      "failed to configure the default snowflake generator, falling back to worker 0, datacenter 0: {}",
      err
    );
    SnowflakeConfig::default()
  });
  SnowflakeGenerator::from_validated(config, SystemClock)
}

/// The process-wide generator. Its identity comes from `SNOWFLAKE_WORKER_ID`,
/// `SNOWFLAKE_DATACENTER_ID` and `SNOWFLAKE_EPOCH`, read once on first use.
pub fn default_generator() -> &'static SnowflakeGenerator {
  &DEFAULT_ID_GEN
}

pub fn next_snowflake_id() -> Result<SnowflakeId, SnowflakeError> {
  DEFAULT_ID_GEN.next_id()
}
