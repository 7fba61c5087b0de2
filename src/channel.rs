use crate::constants::{CHANNEL_PREFIX, CHANNEL_SEPARATOR};

/// Name of the request list shared by every method of `service`.
///
/// All server instances bound to the same service name consume from this
/// list, so whichever instance pops first handles the call.
pub fn request_channel(service: &str) -> String {
    format!("{CHANNEL_PREFIX}{CHANNEL_SEPARATOR}{service}")
}

/// Name of the list a single call's reply is pushed onto.
///
/// The call id is unique among in-flight calls for a `service`/`method`
/// pair, so at most one caller ever waits on the returned name.
pub fn response_channel(service: &str, method: &str, call_id: &str) -> String {
    format!(
        "{CHANNEL_PREFIX}{sep}{service}{sep}{method}{sep}{call_id}",
        sep = CHANNEL_SEPARATOR
    )
}
