use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Inventory parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Required capability unavailable: {0}")]
    MissingCapability(String),

    #[error("Root path is not reachable: {}", .0.display())]
    UnreachableRoot(PathBuf),

    #[error("Operation declined: {0}")]
    Declined(String),

    #[error("Unrecognized confirmation answer '{0}'")]
    InvalidConfirmation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service error: {0}")]
    Service(String),
}

pub type Result<T> = std::result::Result<T, Error>;
