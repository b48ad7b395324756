//! HTTP API module.
//!
//! The dashboard server, its request/response types and the log
//! broadcaster shared with the command-line runs.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server, CompanyLocks};
pub use types::*;
