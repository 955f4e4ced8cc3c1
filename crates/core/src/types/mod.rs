//! Wire and output types for the terminal session

mod inbound;
mod outbound;
mod output;

pub use inbound::{CommandOutput, InboundMessage, SystemStats, ThreatLevel, KNOWN_KINDS};
pub use outbound::{OutboundMessage, QueryContext, DEFAULT_SCAN_TYPE};
pub use output::{OutputKind, OutputLine, SessionEvent};
