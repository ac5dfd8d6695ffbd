//! Table sessions
//!
//! The session manager is the single entry point for everything a
//! cashier does to a table before payment.

pub mod manager;

pub use manager::TableSessionManager;
