//! Sales engine
//!
//! Two layers with very different guarantees:
//!
//! - [`validator`] - the advisory reservation check, fast and allowed
//!   to be stale, used for operator feedback on every line-item edit.
//! - [`commit`] - the authoritative finalize path, a single isolated
//!   transaction that re-validates stock and applies the sale
//!   all-or-nothing.

pub mod commit;
pub mod error;
pub mod validator;

pub use commit::SaleCommitEngine;
pub use error::SaleError;
pub use validator::{Reservation, StockValidator};
