//! Error types for kaliterm-core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Dial, handshake or socket failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Frame is JSON but not a message this client understands
    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    #[error("Not connected to backend")]
    NotConnected,

    #[error("Gave up after {attempts} reconnection attempts")]
    ExhaustedRetries { attempts: u32 },

    /// The session loop has stopped
    #[error("Session closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, CoreError>;

impl From<tokio_tungstenite::tungstenite::Error> for CoreError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        CoreError::Transport(err.to_string())
    }
}

impl CoreError {
    /// Socket-level failure; the connection is gone
    pub fn is_transport(&self) -> bool {
        matches!(self, CoreError::Transport(_))
    }

    /// Bad inbound frame; the connection is still usable
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidMessageFormat(_)
                | CoreError::Serialization(_)
                | CoreError::MessageTooLarge { .. }
        )
    }
}
