//! Structured logging schema and field name constants for vitrine.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log queries can filter on the same names in every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, fallback applied or item abandoned |
//! | INFO  | Lifecycle events, cycle summaries, links created |
//! | DEBUG | Decision points, skipped candidates, config values |
//! | TRACE | Per-item iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID of an HTTP request (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "db", "inference", "seo", "jobs"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "fallback_chain", "interlinker", "synthesizer", "worker"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "generate", "link_inbound", "synthesize", "cycle"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Post id being operated on.
pub const POST_ID: &str = "post_id";

/// Post id of a link target.
pub const TARGET_ID: &str = "target_id";

/// Keyword that produced a link.
pub const KEYWORD: &str = "keyword";

/// Generation provider name.
pub const PROVIDER: &str = "provider";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of items returned or processed.
pub const RESULT_COUNT: &str = "result_count";

/// Number of links created.
pub const LINK_COUNT: &str = "link_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
