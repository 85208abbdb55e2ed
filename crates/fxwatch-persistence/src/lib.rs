//! Holdings persistence.
//!
//! Stores the portfolio as a single JSON document under a fixed name in
//! the configured data directory.

pub mod error;
pub mod store;

pub use error::{PersistenceError, PersistenceResult};
pub use store::HoldingsStore;
