//! Messages received from the backend

use serde::{Deserialize, Serialize};

/// Inbound frame, tagged by `type` on the wire
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Output of an executed command
    CommandResult { result: CommandOutput },

    /// Assistant answer to an ai_query
    AiResponse { response: String },

    /// Backend accepted a scan request
    #[serde(alias = "scan_start")]
    ScanStarted {
        #[serde(default)]
        target: Option<String>,
        #[serde(default)]
        scan_id: Option<String>,
    },

    /// Progress update for a running scan
    ScanProgress {
        progress: f64,
        #[serde(default)]
        details: String,
    },

    /// System stats snapshot
    SystemStats { stats: SystemStats },

    /// Backend-side failure
    Error {
        #[serde(default)]
        message: String,
    },

    /// Connection notice (greeting on accept)
    Connection {
        #[serde(default)]
        message: String,
    },
}

/// Payload of a command_result frame
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommandOutput {
    #[serde(default)]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Host metrics reported by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SystemStats {
    #[serde(default)]
    pub cpu_percent: f64,
    #[serde(default)]
    pub memory_percent: f64,
    #[serde(default)]
    pub network: f64,
    #[serde(default)]
    pub uptime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Coarse load classification derived from CPU and memory usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreatLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl SystemStats {
    /// Threshold on the CPU/memory average: >80 critical, >60 high, >30 medium
    pub fn threat_level(&self) -> ThreatLevel {
        let avg = (self.cpu_percent + self.memory_percent) / 2.0;
        if avg > 80.0 {
            ThreatLevel::Critical
        } else if avg > 60.0 {
            ThreatLevel::High
        } else if avg > 30.0 {
            ThreatLevel::Medium
        } else {
            ThreatLevel::Low
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ThreatLevel::Low => "low",
            ThreatLevel::Medium => "medium",
            ThreatLevel::High => "high",
            ThreatLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Wire tags the router knows how to dispatch
pub const KNOWN_KINDS: &[&str] = &[
    "command_result",
    "ai_response",
    "scan_started",
    "scan_start",
    "scan_progress",
    "system_stats",
    "error",
    "connection",
];
