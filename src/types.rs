use thiserror::Error;

/// Errors surfaced by the filament status backend.
#[derive(Debug, Error)]
pub enum FilamentError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("endpoint error: {0}")]
    Endpoint(String),

    #[error("poll interval must be a positive number of seconds, got {0}")]
    InvalidInterval(f64),
}
