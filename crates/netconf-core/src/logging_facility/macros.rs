//! Operation logging macros
//!
//! Every public RPC operation logs a `start` event on entry and exactly one of
//! `end` / `end_error` on exit.

/// Log the start of an operation
///
/// ```
/// # use netconf_core::log_op_start;
/// log_op_start!("edit_config");
/// log_op_start!("lock", session_id = 3u32);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use netconf_core::log_op_end;
/// log_op_end!("get", duration_ms = 3u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log a failed operation with its rpc-error tag and type
///
/// ```
/// # use netconf_core::{log_op_error, errors::NetconfError};
/// let err = NetconfError::SelfKill;
/// log_op_error!("kill_session", &err, duration_ms = 0u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let nc_err: $crate::errors::NcError = ::std::clone::Clone::clone($err).into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_tag = nc_err.tag().as_str(),
            err_type = nc_err.error_type().as_str(),
            message = nc_err.message(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let nc_err: $crate::errors::NcError = ::std::clone::Clone::clone($err).into();
        tracing::warn!(
            component = module_path!(),
            op = $op,
            event = $crate::types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_tag = nc_err.tag().as_str(),
            err_type = nc_err.error_type().as_str(),
            message = nc_err.message(),
            $($field)*
        );
    }};
}
