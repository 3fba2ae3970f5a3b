use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("Unsupported snapshot version: expected {expected}, got {found}")]
    UnsupportedSnapshotVersion { expected: u32, found: u64 },

    #[error("Unknown {kind} '{id}' referenced by {referrer}")]
    UnknownReference {
        kind:     &'static str,
        id:       String,
        referrer: String,
    },

    #[error("Research graph has a cycle through '{tech}'")]
    ResearchCycle { tech: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SimError {
    pub fn invalid_snapshot(reason: impl Into<String>) -> Self {
        Self::InvalidSnapshot { reason: reason.into() }
    }
}

pub type SimResult<T> = Result<T, SimError>;
