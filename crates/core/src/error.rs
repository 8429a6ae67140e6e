use adherence_types::TextError;

#[derive(Debug, thiserror::Error)]
pub enum AdherenceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] TextError),
    #[error("failed to create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("failed to read store file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize store: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize store: {0}")]
    Deserialization(serde_json::Error),
    #[error("unknown user: {0}")]
    UnknownUser(crate::UserId),
    #[error("persistence unavailable: {0}")]
    Unavailable(String),
}

pub type AdherenceResult<T> = std::result::Result<T, AdherenceError>;
