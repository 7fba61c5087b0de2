/// Prefix shared by every request and response list.
pub const CHANNEL_PREFIX: &str = "NanoRPCs";

/// Separator placed between the components of a channel name.
pub const CHANNEL_SEPARATOR: char = ':';

/// Human-readable message attached to successful replies.
pub const REPLY_OK_MESSAGE: &str = "OK";

/// Human-readable message attached to replies for unregistered methods.
pub const REPLY_MISSING_METHOD_MESSAGE: &str = "Missing Method";
