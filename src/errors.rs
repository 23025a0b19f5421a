use crate::config::ConsentConfigError;

#[derive(Debug, thiserror::Error)]
pub enum ConsentError {
    #[error("Duplicate identifier in consent tree: {0}")]
    DuplicateIdentifier(String),

    #[error("Duplicate category ID in consent tree: {0}")]
    DuplicateCategoryId(u32),

    #[error("Duplicate option ID {option} in category {category}")]
    DuplicateOptionId { category: String, option: u32 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConsentConfigError),
}

impl From<anyhow::Error> for ConsentError {
    fn from(err: anyhow::Error) -> Self {
        ConsentError::Storage(err.to_string())
    }
}
