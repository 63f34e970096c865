//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_SPAN_ID: &str = "span_id";

// Restore identifiers
pub const FIELD_RUN_ID: &str = "run_id";
pub const FIELD_INSTANCE: &str = "instance";
pub const FIELD_MODE: &str = "mode";
pub const FIELD_HASH: &str = "hash";
pub const FIELD_TARGET: &str = "target";
pub const FIELD_OPERATION: &str = "operation";

// Plan sizes
pub const FIELD_PLAN_OPS: &str = "plan_ops";
pub const FIELD_EXCLUDED: &str = "excluded";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
