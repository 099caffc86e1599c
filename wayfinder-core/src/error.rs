use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Negative edge weight {weight} between '{from}' and '{to}'")]
    NegativeWeight { from: String, to: String, weight: i64 },

    #[error("Invalid marker pixel width: {0} (must be > 0)")]
    InvalidPixelWidth(f32),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
