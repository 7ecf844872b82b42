/// Worker tokens per collection type
pub const DEFAULT_MAX_WORKERS: usize = 1024;
/// Inbound queue capacity per collection type
pub const DEFAULT_QUEUE_DEPTH: usize = 1024;
/// Upper bound on a single store call (30 seconds)
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 30_000;
/// Completion topics are `<prefix>.<type>_events`
pub const DEFAULT_TOPIC_PREFIX: &str = "gobmp.parsed";
pub const DEFAULT_LOG_FILTER: &str = "info";
