use std::sync::Once;

use snowflake_id::preclude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::Subscriber;
use tracing_subscriber::util::SubscriberInitExt;

pub fn setup_log() {
  static START: Once = Once::new();
  START.call_once(|| {
    let level = "trace";
    let filters = [format!("snowflake_id={}", level)];
    unsafe {
      std::env::set_var("RUST_LOG", filters.join(","));
    }

    let subscriber = Subscriber::builder()
      .with_env_filter(EnvFilter::from_default_env())
      .with_ansi(true)
      .finish();
    subscriber.try_init().unwrap();
  });
}

/// A generator with a zero epoch, so decoded timestamps equal the clock readings.
pub fn make_test_generator<C: Clock>(
  worker_id: i64,
  datacenter_id: i64,
  clock: C,
) -> SnowflakeGenerator<C> {
  setup_log();
  let config = SnowflakeConfig::new(worker_id, datacenter_id).epoch(0);
  SnowflakeGenerator::with_clock(config, clock).unwrap()
}

pub fn assert_strictly_increasing(ids: &[SnowflakeId]) {
  for pair in ids.windows(2) {
    assert!(
      pair[0].as_u64() < pair[1].as_u64(),
      "{} is not less than {}",
      pair[0],
      pair[1]
    );
  }
}
