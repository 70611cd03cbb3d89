use thiserror::Error;

/// Errors returned by the trainer.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("unknown training parameter: {0}")]
    UnknownParameter(String),

    #[error("invalid value for {key}: {reason}")]
    InvalidParameter { key: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("registry error: {0}")]
    Registry(#[from] review_registry::RegistryError),
}
