use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid parameters type")]
    SchemaKind,

    #[error("tool arguments are not a JSON object: {0}")]
    ArgDecode(String),

    #[error("tool `{name}` handler failed: {message}")]
    HandlerFailure { name: String, message: String },

    #[error("chunk overlap must lie in [0, 1), got {0}")]
    InvalidOverlap(f32),

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("embedding request failed with status {status}: {body}")]
    Embedding { status: u16, body: String },

    #[error("extraction result does not match the target schema: {0}")]
    ExtractionMismatch(String),

    #[error("malformed message payload: {0}")]
    MemoryDecode(String),

    #[error("vector store error: {0}")]
    Store(String),

    #[error("delegated core error: {0}")]
    Core(String),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
