//! Canonical field keys and event names for structured logging

pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// NETCONF context
pub const FIELD_SESSION_ID: &str = "session_id";
pub const FIELD_MESSAGE_ID: &str = "message_id";
pub const FIELD_DATASTORE: &str = "datastore";
pub const FIELD_USERNAME: &str = "username";
pub const FIELD_REMOTE: &str = "remote";

// Result sizes
pub const FIELD_NODE_COUNT: &str = "node_count";
pub const FIELD_CHANGE_COUNT: &str = "change_count";

// Error fields (match the field names emitted by `log_op_error!`)
pub const FIELD_ERR_TAG: &str = "err_tag";
pub const FIELD_ERR_TYPE: &str = "err_type";

pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_AUDIT: &str = "audit";

/// Tracing target for audit records
pub const AUDIT_TARGET: &str = "netconf::audit";
