use assert_matches2::assert_matches;
use snowflake_id::preclude::*;

use crate::util::make_test_generator;

#[test]
fn id_string_round_trip_test() {
  let id_gen = make_test_generator(1, 1, ManualClock::new(123_456_789));
  let id = id_gen.next_id().unwrap();
  let text = id.to_string();
  assert_eq!(text, id.as_i64().to_string());
  assert_eq!(text.parse::<SnowflakeId>().unwrap(), id);
}

#[test]
fn id_serde_is_a_plain_integer_test() {
  let id = SnowflakeId::try_from(4_198_401_i64).unwrap();
  let json = serde_json::to_string(&id).unwrap();
  assert_eq!(json, "4198401");
  let back: SnowflakeId = serde_json::from_str(&json).unwrap();
  assert_eq!(back, id);

  assert!(serde_json::from_str::<SnowflakeId>("-1").is_err());
  assert!(serde_json::from_str::<SnowflakeId>(&i64::MIN.to_string()).is_err());
}

#[test]
fn reject_sign_bit_test() {
  assert_matches!(SnowflakeId::try_from(-1_i64), Err(SnowflakeError::InvalidId(_)));
  assert_matches!(SnowflakeId::try_from(u64::MAX), Err(SnowflakeError::InvalidId(_)));
  assert_matches!("-5".parse::<SnowflakeId>(), Err(SnowflakeError::InvalidId(_)));
  assert_matches!("abc".parse::<SnowflakeId>(), Err(SnowflakeError::InvalidId(_)));

  let id = SnowflakeId::try_from(i64::MAX as u64).unwrap();
  assert_eq!(u64::from(id), i64::MAX as u64);
  assert_eq!(i64::from(id), i64::MAX);
}
