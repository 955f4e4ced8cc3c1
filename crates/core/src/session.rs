//! Terminal session orchestration
//!
//! [`Session`] composes the connection manager, router, classifier,
//! suggestion engine and history into the operations a front end calls.
//! It performs no I/O: transport work is queued as [`Effect`]s and drained
//! by the runtime with [`Session::take_effects`]. Output goes to an
//! append-only log and to every subscriber.

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::broadcast;

use crate::classifier::{classify, BuiltIn, Classification, QUERY_MARKER};
use crate::config::SessionConfig;
use crate::history::HistoryNavigator;
use crate::protocol::MessageCodec;
use crate::router::MessageRouter;
use crate::suggest::suggest;
use crate::transport::{ConnectionManager, ConnectionState, Effect, Generation, ReconnectPolicy};
use crate::types::{
    OutboundMessage, OutputKind, OutputLine, QueryContext, SessionEvent, SystemStats, ThreatLevel,
};
use crate::{CoreError, Result};

const HELP_TEXT: &str = "\
Built-in commands: clear, help, status
Prefix a line with 'ai:' to ask the assistant, e.g. ai: how do I enumerate SMB shares
Anything else runs on the backend, e.g. nmap -sV 10.0.0.5, nikto -h 10.0.0.5
Keys: Up/Down recall history, Tab accepts the first suggestion, Esc exits";

/// Read-only snapshot of session state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub connection: ConnectionState,
    pub retry_count: u32,
    pub working_path: String,
    pub message_count: u64,
    pub last_activity: Option<DateTime<Local>>,
    pub active_scans: u32,
    pub stats: Option<SystemStats>,
    pub threat_level: ThreatLevel,
    /// Submitted commands and queries still waiting for an answer
    pub pending_replies: u32,
    pub history_len: usize,
    pub output_len: usize,
    pub input: String,
    pub suggestions: Vec<String>,
}

impl SessionView {
    pub fn is_processing(&self) -> bool {
        self.pending_replies > 0
    }
}

/// One terminal session
pub struct Session {
    config: SessionConfig,
    connection: ConnectionManager,
    router: MessageRouter,
    history: HistoryNavigator,
    output: Vec<OutputLine>,
    input: String,
    suggestions: Vec<String>,
    events: broadcast::Sender<SessionEvent>,
    effects: Vec<Effect>,
}

impl Session {
    /// Build an idle session; fails only on an unusable backend URL
    pub fn new(config: SessionConfig) -> Result<Self> {
        let url = config.ws_url()?;
        let policy = ReconnectPolicy::from_config(&config);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Ok(Self {
            connection: ConnectionManager::new(url, policy),
            router: MessageRouter::new(),
            history: HistoryNavigator::new(),
            output: Vec::new(),
            input: String::new(),
            suggestions: Vec::new(),
            events,
            effects: Vec::new(),
            config,
        })
    }

    /// Begin connecting
    pub fn start(&mut self) {
        if let Some(line) = self.connection.connect(&mut self.effects) {
            self.emit(line);
        }
    }

    /// Submit one line of user input
    pub fn submit(&mut self, text: &str) {
        let Some(classification) = classify(text) else {
            return;
        };
        let text = text.trim();

        self.history.append(text);
        self.input.clear();
        self.suggestions.clear();
        self.emit(OutputLine::new(
            OutputKind::Command,
            format!("{}$ {}", self.config.working_path, text),
        ));

        match classification {
            Classification::BuiltIn(builtin) => self.run_builtin(builtin),
            Classification::AiQuery(query) if query.is_empty() => {
                self.emit(OutputLine::warning(format!(
                    "Usage: {} <question>",
                    QUERY_MARKER
                )));
            }
            Classification::AiQuery(query) => {
                tracing::debug!("Routing as AI query: {}", query);
                let context = QueryContext::at_path(self.config.working_path.clone());
                if self.send(OutboundMessage::ai_query(query, context)) {
                    self.router.expect_reply();
                }
            }
            Classification::Execute(command) => {
                tracing::debug!("Routing as command: {}", command);
                if self.send(OutboundMessage::execute(command)) {
                    self.router.expect_reply();
                }
            }
        }
    }

    /// Replace the current input and refresh suggestions
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.refresh_suggestions();
    }

    /// Copy suggestion `index` into the input; never submits
    ///
    /// Returns false when there is no such suggestion.
    pub fn accept_suggestion(&mut self, index: usize) -> bool {
        let Some(choice) = self.suggestions.get(index).cloned() else {
            return false;
        };
        self.input = choice;
        self.suggestions.clear();
        true
    }

    /// Step back through history; returns the resulting input
    pub fn recall_previous(&mut self) -> &str {
        if let Some(text) = self.history.recall_previous() {
            self.input = text.to_owned();
            self.refresh_suggestions();
        }
        &self.input
    }

    /// Step forward through history; returns the resulting input
    pub fn recall_next(&mut self) -> &str {
        if let Some(text) = self.history.recall_next() {
            self.input = text.to_owned();
            self.refresh_suggestions();
        }
        &self.input
    }

    /// Ask the backend to scan `target`
    pub fn scan_target(&mut self, target: &str, scan_type: &str) {
        let target = target.trim();
        if target.is_empty() {
            return;
        }
        self.emit(OutputLine::info(format!(
            "Requesting {} scan of {}",
            scan_type, target
        )));
        self.send(OutboundMessage::scan(target, scan_type));
    }

    /// Request a stats snapshot; skipped silently unless connected
    pub fn poll_stats(&mut self) {
        if !self.connection.can_send() {
            tracing::trace!("Skipping stats poll: connection is {}", self.connection.state());
            return;
        }
        self.send(OutboundMessage::system_stats());
    }

    /// Shut the session down; no reconnect follows
    pub fn close(&mut self) {
        if let Some(line) = self.connection.close(&mut self.effects) {
            self.router.clear_pending();
            self.emit(line);
        }
    }

    pub fn on_open(&mut self, generation: Generation) {
        if let Some(line) = self.connection.on_open(generation) {
            self.emit(line);
        }
    }

    pub fn on_frame(&mut self, generation: Generation, frame: &str) {
        if generation != self.connection.generation() || !self.connection.can_send() {
            tracing::debug!("Dropping frame from stale connection (generation {})", generation);
            return;
        }
        if let Some(line) = self.router.route(frame) {
            self.emit(line);
        }
    }

    pub fn on_error(&mut self, generation: Generation, error: &CoreError) {
        if let Some(line) = self.connection.on_error(generation, error) {
            self.emit(line);
        }
    }

    pub fn on_close(&mut self, generation: Generation) {
        if let Some(line) = self.connection.on_close(generation, &mut self.effects) {
            self.router.clear_pending();
            self.emit(line);
        }
    }

    pub fn on_reconnect_timer(&mut self, generation: Generation) {
        self.connection.on_reconnect_timer(generation, &mut self.effects);
    }

    /// Drain queued transport work
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn event_sender(&self) -> broadcast::Sender<SessionEvent> {
        self.events.clone()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            connection: self.connection.state(),
            retry_count: self.connection.retry_count(),
            working_path: self.config.working_path.clone(),
            message_count: self.router.message_count(),
            last_activity: self.router.last_activity(),
            active_scans: self.router.active_scans(),
            stats: self.router.stats().cloned(),
            threat_level: self.router.threat_level(),
            pending_replies: self.router.pending_replies(),
            history_len: self.history.len(),
            output_len: self.output.len(),
            input: self.input.clone(),
            suggestions: self.suggestions.clone(),
        }
    }

    /// Full output log in emission order
    pub fn output(&self) -> &[OutputLine] {
        &self.output
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// True once closed by the owner or after exhausting retries
    pub fn is_closed(&self) -> bool {
        self.connection.state() == ConnectionState::Closed
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn run_builtin(&mut self, builtin: BuiltIn) {
        tracing::debug!("Running built-in: {}", builtin.name());
        match builtin {
            BuiltIn::Clear => {
                let _ = self.events.send(SessionEvent::ClearScreen);
            }
            BuiltIn::Help => self.emit(OutputLine::info(HELP_TEXT)),
            BuiltIn::Status => {
                let line = status_line(&self.view());
                self.emit(OutputLine::info(line));
            }
        }
    }

    /// Returns true once the frame is queued for the live connection
    fn send(&mut self, msg: OutboundMessage) -> bool {
        let frame = match MessageCodec::encode(&msg) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Failed to encode {}: {}", msg.kind(), e);
                self.emit(OutputLine::error(format!("Could not send request: {}", e)));
                return false;
            }
        };

        match self.connection.transmit(frame, &mut self.effects) {
            Ok(()) => true,
            Err(e) => {
                self.emit(OutputLine::warning(e.to_string()));
                false
            }
        }
    }

    fn refresh_suggestions(&mut self) {
        self.suggestions = if self.config.suggestions_enabled {
            suggest(&self.input)
        } else {
            Vec::new()
        };
    }

    fn emit(&mut self, line: OutputLine) {
        // No subscribers is fine; the log keeps everything
        let _ = self.events.send(SessionEvent::Line(line.clone()));
        self.output.push(line);
    }
}

fn status_line(view: &SessionView) -> String {
    let mut status = format!(
        "Connection: {} | Messages: {} | Active scans: {} | Threat level: {} | Path: {}",
        view.connection, view.message_count, view.active_scans, view.threat_level, view.working_path
    );
    if let Some(stats) = &view.stats {
        status.push_str(&format!(
            " | CPU: {:.1}% | Memory: {:.1}%",
            stats.cpu_percent, stats.memory_percent
        ));
    }
    if let Some(at) = view.last_activity {
        status.push_str(&format!(" | Last activity: {}", at.format("%H:%M:%S")));
    }
    status
}
