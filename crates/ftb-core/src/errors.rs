/// Core error type.
///
/// The adapter crate maps its platform-specific errors into this type so the
/// engine can handle failures consistently (transient platform failures get a
/// narrow catch + local cleanup; everything else bubbles to the dispatcher).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, Error>;
