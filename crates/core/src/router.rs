//! Inbound message routing
//!
//! Frames are decoded by [`MessageCodec`], counted, then dispatched by kind.
//! Each handler yields at most one [`OutputLine`]. Nothing here returns an
//! error to the caller: malformed and unknown frames are logged and dropped.

use chrono::{DateTime, Local};

use crate::protocol::{DecodedFrame, MessageCodec};
use crate::types::{CommandOutput, InboundMessage, OutputKind, OutputLine, SystemStats, ThreatLevel};

/// Dispatches inbound frames and tracks activity counters
#[derive(Debug, Default)]
pub struct MessageRouter {
    message_count: u64,
    last_activity: Option<DateTime<Local>>,
    active_scans: u32,
    stats: Option<SystemStats>,
    pending_replies: u32,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and dispatch one text frame
    pub fn route(&mut self, frame: &str) -> Option<OutputLine> {
        let decoded = match MessageCodec::decode(frame) {
            Ok(decoded) => decoded,
            Err(e) if e.is_protocol() => {
                tracing::warn!("Dropping malformed frame: {}", e);
                return None;
            }
            Err(e) => {
                tracing::error!("Failed to decode frame: {}", e);
                return None;
            }
        };

        self.message_count += 1;
        self.last_activity = Some(Local::now());

        match decoded {
            DecodedFrame::Known(msg) => self.dispatch(msg),
            DecodedFrame::Unknown(kind) => {
                tracing::debug!("Ignoring message with unknown type: {}", kind);
                None
            }
        }
    }

    /// Apply one decoded message
    pub fn dispatch(&mut self, msg: InboundMessage) -> Option<OutputLine> {
        match msg {
            InboundMessage::CommandResult { result } => {
                self.reply_received();
                Some(command_result_line(result))
            }
            InboundMessage::AiResponse { response } => {
                self.reply_received();
                Some(OutputLine::new(OutputKind::Ai, format!("AI: {}", response)))
            }
            InboundMessage::ScanStarted { target, scan_id } => {
                self.active_scans = self.active_scans.saturating_add(1);
                let label = target
                    .or(scan_id)
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "unknown target".to_string());
                tracing::info!("Scan started ({} active)", self.active_scans);
                Some(OutputLine::info(format!("Scan started: {}", label)))
            }
            InboundMessage::ScanProgress { progress, details } => {
                if progress >= 100.0 {
                    self.active_scans = self.active_scans.saturating_sub(1);
                    tracing::info!("Scan finished ({} active)", self.active_scans);
                }
                Some(OutputLine::new(
                    OutputKind::Progress,
                    format!("[{}%] {}", progress, details),
                ))
            }
            InboundMessage::SystemStats { stats } => {
                tracing::trace!("Stats update: cpu {}% mem {}%", stats.cpu_percent, stats.memory_percent);
                self.stats = Some(stats);
                None
            }
            InboundMessage::Error { message } => {
                self.reply_received();
                let content = if message.is_empty() {
                    "An error occurred".to_string()
                } else {
                    message
                };
                Some(OutputLine::error(content))
            }
            InboundMessage::Connection { message } => Some(OutputLine::system(message)),
        }
    }

    /// Note a request whose answer is a command_result, ai_response or error
    pub fn expect_reply(&mut self) {
        self.pending_replies = self.pending_replies.saturating_add(1);
    }

    /// Forget outstanding requests; their connection is gone
    pub fn clear_pending(&mut self) {
        self.pending_replies = 0;
    }

    pub fn pending_replies(&self) -> u32 {
        self.pending_replies
    }

    fn reply_received(&mut self) {
        self.pending_replies = self.pending_replies.saturating_sub(1);
    }

    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    pub fn last_activity(&self) -> Option<DateTime<Local>> {
        self.last_activity
    }

    pub fn active_scans(&self) -> u32 {
        self.active_scans
    }

    pub fn stats(&self) -> Option<&SystemStats> {
        self.stats.as_ref()
    }

    /// Low until the first stats report arrives
    pub fn threat_level(&self) -> ThreatLevel {
        self.stats
            .as_ref()
            .map(SystemStats::threat_level)
            .unwrap_or_default()
    }
}

fn command_result_line(result: CommandOutput) -> OutputLine {
    let content = if result.output.is_empty() {
        "Command executed".to_string()
    } else {
        result.output
    };
    OutputLine::new(OutputKind::Output, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn route_all(router: &mut MessageRouter, frames: &[&str]) -> Vec<OutputLine> {
        frames.iter().filter_map(|f| router.route(f)).collect()
    }

    #[test]
    fn test_scan_progress_completion_is_clamped() {
        let mut router = MessageRouter::new();
        router.route(r#"{"type":"scan_started","target":"10.0.0.5"}"#);
        assert_eq!(router.active_scans(), 1);

        let done = r#"{"type":"scan_progress","progress":100,"details":"done"}"#;
        let line = router.route(done).unwrap();
        assert_eq!(line.kind, OutputKind::Progress);
        assert_eq!(line.content, "[100%] done");
        assert_eq!(router.active_scans(), 0);

        router.route(done);
        assert_eq!(router.active_scans(), 0);
    }

    #[test]
    fn test_partial_progress_keeps_scan_active() {
        let mut router = MessageRouter::new();
        router.route(r#"{"type":"scan_start","scan_id":"s-1"}"#);
        let line = router
            .route(r#"{"type":"scan_progress","progress":42.5,"details":"port 443"}"#)
            .unwrap();
        assert_eq!(line.content, "[42.5%] port 443");
        assert_eq!(router.active_scans(), 1);
    }

    #[test]
    fn test_handler_lines() {
        let mut router = MessageRouter::new();
        let lines = route_all(
            &mut router,
            &[
                r#"{"type":"command_result","result":{"output":"root"}}"#,
                r#"{"type":"command_result","result":{"output":""}}"#,
                r#"{"type":"ai_response","response":"Try nmap"}"#,
                r#"{"type":"error","message":"boom"}"#,
                r#"{"type":"error"}"#,
                r#"{"type":"connection","message":"Connected to Kali Terminal"}"#,
            ],
        );

        let rendered: Vec<_> = lines.iter().map(|l| (l.kind, l.content.as_str())).collect();
        assert_eq!(
            rendered,
            vec![
                (OutputKind::Output, "root"),
                (OutputKind::Output, "Command executed"),
                (OutputKind::Ai, "AI: Try nmap"),
                (OutputKind::Error, "boom"),
                (OutputKind::Error, "An error occurred"),
                (OutputKind::System, "Connected to Kali Terminal"),
            ]
        );
        assert_eq!(router.message_count(), 6);
    }

    #[test]
    fn test_replies_settle_pending_requests() {
        let mut router = MessageRouter::new();
        router.expect_reply();
        router.expect_reply();
        router.expect_reply();

        router.route(r#"{"type":"scan_progress","progress":50,"details":"x"}"#);
        router.route(r#"{"type":"system_stats","stats":{}}"#);
        router.route(r#"{"type":"connection","message":"hi"}"#);
        assert_eq!(router.pending_replies(), 3, "only replies settle requests");

        router.route(r#"{"type":"command_result","result":{"output":"ok"}}"#);
        router.route(r#"{"type":"ai_response","response":"sure"}"#);
        assert_eq!(router.pending_replies(), 1);
        router.route(r#"{"type":"error","message":"denied"}"#);
        router.route(r#"{"type":"error","message":"unsolicited"}"#);
        assert_eq!(router.pending_replies(), 0);

        router.expect_reply();
        router.clear_pending();
        assert_eq!(router.pending_replies(), 0);
    }

    #[test]
    fn test_stats_update_is_silent_and_sets_threat_level() {
        let mut router = MessageRouter::new();
        assert_eq!(router.threat_level(), ThreatLevel::Low);

        let line = router.route(
            r#"{"type":"system_stats","stats":{"cpu_percent":90,"memory_percent":80,"network":1.5,"uptime":"Running"}}"#,
        );
        assert!(line.is_none());
        assert_eq!(router.stats().map(|s| s.uptime.as_str()), Some("Running"));
        assert_eq!(router.threat_level(), ThreatLevel::Critical);
    }

    #[test]
    fn test_unknown_kind_counted_but_dropped() {
        let mut router = MessageRouter::new();
        assert!(router.route(r#"{"type":"heartbeat"}"#).is_none());
        assert_eq!(router.message_count(), 1);
        assert!(router.last_activity().is_some());
    }

    #[test]
    fn test_malformed_frames_not_counted() {
        let mut router = MessageRouter::new();
        for frame in ["not json", "[1,2]", r#"{"kind":"x"}"#, r#"{"type":"ai_response"}"#] {
            assert!(router.route(frame).is_none(), "frame {:?}", frame);
        }
        assert_eq!(router.message_count(), 0);
        assert!(router.last_activity().is_none());
    }
}
