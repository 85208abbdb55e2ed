//! Forex tick tracker application.
//!
//! Orchestrates the components:
//! - WebSocket connection to the tick feed
//! - Trade reconciliation into the latest-price table
//! - Portfolio valuation and persistence

pub mod app;
pub mod config;
pub mod error;
pub mod supervisor;

pub use app::Application;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use supervisor::ConnectionSupervisor;
