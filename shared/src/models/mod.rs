//! Data models
//!
//! Shared between pos-server and front ends (via API).
//! All monetary amounts are integer cents (`i64`); quantities and
//! stock counts are `u32`.

pub mod pending_order;
pub mod product;
pub mod sale;
pub mod table;

// Re-exports
pub use pending_order::*;
pub use product::*;
pub use sale::*;
pub use table::*;
