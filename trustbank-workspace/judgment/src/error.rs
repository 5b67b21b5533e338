use thiserror::Error;

#[derive(Debug, Error)]
pub enum JudgeError {
    /// Caller bug: a value outside the accepted domain reached the engine.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid rule table: {0}")]
    InvalidRuleTable(String),

    #[error("failed to parse rule table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read rule table: {0}")]
    Io(#[from] std::io::Error),
}
