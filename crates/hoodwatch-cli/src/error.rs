use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid arguments: {0}")]
    Arguments(String),

    #[error("tool call failed: {0}")]
    ToolFailed(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Stream(#[from] hoodwatch_agent::StreamError),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Arguments(_) => 2,
            Self::ToolFailed(_) => 3,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
            Self::Stream(hoodwatch_agent::StreamError::Serialization(_)) => 4,
            Self::Stream(hoodwatch_agent::StreamError::Io(_)) => 10,
        }
    }
}
