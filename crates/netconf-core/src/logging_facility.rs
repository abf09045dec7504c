//! Logging facility
//!
//! Structured `tracing` output for every RPC operation:
//! - `init` installs the process subscriber for a `Profile`
//! - `macros` provides `log_op_start!`, `log_op_end!` and `log_op_error!`
//! - `test_capture` records events in memory so tests can assert on them

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
