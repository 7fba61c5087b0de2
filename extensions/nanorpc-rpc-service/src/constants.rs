use std::time::Duration;

/// How long a server's blocking pop waits before re-checking whether it
/// has been asked to stop. Also bounds how quickly `stop()` returns.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Clients wait for a reply indefinitely unless a deadline is configured.
pub const DEFAULT_CALL_TIMEOUT: Option<Duration> = None;
