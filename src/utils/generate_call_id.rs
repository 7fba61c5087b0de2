use crate::utils::now;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

/// Random per-process salt, so ids minted by two processes that start in
/// the same microsecond still differ.
static PROCESS_SALT: Lazy<u64> = Lazy::new(rand::random::<u64>);

/// Monotonic counter, so ids minted within one process never repeat.
static CALL_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates an opaque call identifier.
///
/// The id is built from the current time, a per-process random salt, and a
/// per-process counter. It is only required to be unique among in-flight
/// calls for one service/method pair, which this comfortably satisfies
/// across processes sharing a queue.
///
/// The result is lowercase hex and never contains the channel separator.
pub fn generate_call_id() -> String {
    let sequence = CALL_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}{:016x}{:x}", now(), *PROCESS_SALT, sequence)
}
