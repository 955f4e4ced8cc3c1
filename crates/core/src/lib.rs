//! Kaliterm Core - session and protocol logic for an AI-assisted terminal
//!
//! This crate provides:
//! - Wire types and the JSON codec for the backend WebSocket protocol
//! - Connection lifecycle with bounded fixed-delay reconnection
//! - Inbound message routing and activity counters
//! - Command classification, suggestions and history recall
//! - The session orchestrator and the tokio runtime that drives it

pub mod classifier;
pub mod config;
pub mod error;
pub mod history;
pub mod protocol;
pub mod router;
pub mod runtime;
pub mod session;
pub mod suggest;
pub mod transport;
pub mod types;

// Re-export common types
pub use classifier::{classify, BuiltIn, Classification};
pub use config::SessionConfig;
pub use error::{CoreError, Result};
pub use protocol::MessageCodec;
pub use runtime::{spawn, SessionHandle};
pub use session::{Session, SessionView};
pub use transport::ConnectionState;
pub use types::{InboundMessage, OutboundMessage, OutputKind, OutputLine, SessionEvent};
