//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] Box<fxwatch_ws::WsError>),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] fxwatch_telemetry::TelemetryError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] fxwatch_persistence::PersistenceError),
}

pub type AppResult<T> = Result<T, AppError>;
