//! Messages sent from the terminal to the backend

use serde::{Deserialize, Serialize};

/// Default scan profile when the caller does not pick one
pub const DEFAULT_SCAN_TYPE: &str = "basic";

/// Outbound frame, tagged by `type` on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Run a raw command on the backend
    ExecuteCommand { command: String, target: String },

    /// Natural-language query for the backend assistant
    AiQuery { query: String, context: QueryContext },

    /// Request a system stats snapshot
    SystemStats,

    /// Start a scan against a target
    ScanTarget { target: String, scan_type: String },
}

/// Context attached to an AI query
///
/// The backend accepts either a bare label or a structured object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum QueryContext {
    /// Where the query was typed and when (RFC 3339)
    Terminal { path: String, timestamp: String },
    /// Free-form label such as `"terminal"`
    Label(String),
}

impl QueryContext {
    /// Context stamped with the current local time
    pub fn at_path(path: impl Into<String>) -> Self {
        Self::Terminal {
            path: path.into(),
            timestamp: chrono::Local::now().to_rfc3339(),
        }
    }
}

impl OutboundMessage {
    /// Create execute_command message with no explicit target
    pub fn execute(command: impl Into<String>) -> Self {
        Self::ExecuteCommand {
            command: command.into(),
            target: String::new(),
        }
    }

    /// Create ai_query message
    pub fn ai_query(query: impl Into<String>, context: QueryContext) -> Self {
        Self::AiQuery {
            query: query.into(),
            context,
        }
    }

    /// Create system_stats request
    pub fn system_stats() -> Self {
        Self::SystemStats
    }

    /// Create scan_target message
    pub fn scan(target: impl Into<String>, scan_type: impl Into<String>) -> Self {
        Self::ScanTarget {
            target: target.into(),
            scan_type: scan_type.into(),
        }
    }

    /// Wire tag of this message
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExecuteCommand { .. } => "execute_command",
            Self::AiQuery { .. } => "ai_query",
            Self::SystemStats => "system_stats",
            Self::ScanTarget { .. } => "scan_target",
        }
    }
}
