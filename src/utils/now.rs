/// Returns the current timestamp in microseconds since the UNIX epoch.
///
/// Falls back to `0` if the clock reports a time before the epoch.
///
/// # Example:
/// ```rust
/// use nanorpc::utils::now;
/// let timestamp = now();
/// assert!(timestamp > 0);
/// ```
pub fn now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_micros()).unwrap_or(0)
}
