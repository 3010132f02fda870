use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("transaction not found")]
    NotFound,

    #[error("protocol: {0}")]
    Protocol(String),

    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("paypack api error: status={status} body={body}")]
    Provider { status: u16, body: String },

    #[error("notifier: {0}")]
    Notifier(String),

    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("task: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PipelineError {
    /// The polling loop keeps going on this one and stops on everything else.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
