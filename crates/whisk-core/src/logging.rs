//! Structured logging schema and field name constants for Whisk.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), completed imports |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-element iteration (reducer scoring, selector probing) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated across a request. Format: UUIDv7.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "import", "db", "inference", "auth"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "fetcher", "reducer", "normalizer", "ollama", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "fetch", "reduce", "normalize", "enhance", "generate"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Recipe UUID being operated on.
pub const RECIPE_ID: &str = "recipe_id";

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Owning user identifier.
pub const USER_ID: &str = "user_id";

/// Source URL of an import.
pub const URL: &str = "url";

// ─── Import fields ─────────────────────────────────────────────────────────

/// How a recipe was parsed ("JSON-LD", "AI", "Manual + AI").
pub const PARSING_METHOD: &str = "parsing_method";

/// Whether the normalizer fell back to the hostname stub.
pub const DEGRADED: &str = "degraded";

/// Reduction strategy that produced the content ("recipe_selector", "main_content",
/// "keyword_score" or "body").
pub const STRATEGY: &str = "strategy";

/// Character length of fetched or reduced content.
pub const CONTENT_LEN: &str = "content_len";

/// HTTP status returned by a fetched page.
pub const HTTP_STATUS: &str = "http_status";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of a prompt.
pub const PROMPT_LEN: &str = "prompt_len";

/// Byte length of a model response.
pub const RESPONSE_LEN: &str = "response_len";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Inference fields ──────────────────────────────────────────────────────

/// Model name used for inference.
pub const MODEL: &str = "model";

/// Whether JSON output mode was requested.
pub const JSON_MODE: &str = "json_mode";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Slow operation threshold exceeded.
pub const SLOW: &str = "slow";
