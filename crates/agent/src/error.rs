use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("malformed packet: {0}")]
    MalformedPacket(#[from] serde_json::Error),
    #[error("packet is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    #[error("band {band} is not a finite f32: {value}")]
    NonFiniteBand { band: &'static str, value: f32 },
    #[error("line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AgentError {
    /// True for errors caused by a single bad input line, which the stream
    /// loop skips rather than aborting on.
    #[must_use]
    pub fn is_malformed_packet(&self) -> bool {
        matches!(
            self,
            AgentError::MalformedPacket(_)
                | AgentError::InvalidUtf8(_)
                | AgentError::NonFiniteBand { .. }
                | AgentError::LineTooLong { .. }
        )
    }
}
