pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod id_gen;
pub mod layout;

pub mod preclude {
  pub use crate::clock::{Clock, ManualClock, ScriptedClock, SystemClock};
  pub use crate::config::{SnowflakeConfig, WaitStrategy};
  pub use crate::error::SnowflakeError;
  pub use crate::generator::SnowflakeGenerator;
  pub use crate::id_gen::{default_generator, next_snowflake_id};
  pub use crate::layout::{DEFAULT_EPOCH, SnowflakeId, SnowflakeParts};
}
