//! Reconnection logic with a fixed delay
//!
//! Lifecycle: Idle -> Connecting -> Open -> {Reconnecting, Closed}.
//! Only the close transition drives retry accounting; transport errors are
//! reported but never counted, since the socket always follows an error
//! with a close.

use serde::Serialize;
use std::fmt;
use std::time::Duration;

use super::{Effect, Generation};
use crate::config::SessionConfig;
use crate::types::OutputLine;
use crate::{CoreError, Result};

/// Reconnection configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Attempts before the session gives up for good
    pub max_retries: u32,
    /// Fixed wait before each attempt
    pub delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_millis(3000),
        }
    }
}

impl ReconnectPolicy {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: config.reconnect_delay(),
        }
    }
}

/// Connection state as seen by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    /// Waiting out the delay before attempt `attempt`
    Reconnecting { attempt: u32 },
    /// Terminal: closed by the owner or retries exhausted
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Idle => f.write_str("idle"),
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Open => f.write_str("open"),
            ConnectionState::Reconnecting { attempt } => write!(f, "reconnecting (attempt {})", attempt),
            ConnectionState::Closed => f.write_str("closed"),
        }
    }
}

/// Owns the connection lifecycle for one session
#[derive(Debug)]
pub struct ConnectionManager {
    url: String,
    policy: ReconnectPolicy,
    state: ConnectionState,
    retry_count: u32,
    generation: Generation,
    explicit_close: bool,
    reconnect_pending: bool,
    opened_once: bool,
    error_reported: bool,
}

impl ConnectionManager {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
            state: ConnectionState::Idle,
            retry_count: 0,
            generation: 0,
            explicit_close: false,
            reconnect_pending: false,
            opened_once: false,
            error_reported: false,
        }
    }

    /// Start the first dial
    pub fn connect(&mut self, effects: &mut Vec<Effect>) -> Option<OutputLine> {
        if self.state != ConnectionState::Idle {
            tracing::warn!("connect() ignored in state {}", self.state);
            return None;
        }
        self.dial(effects);
        Some(OutputLine::system(format!("Connecting to {}...", self.url)))
    }

    pub fn on_open(&mut self, generation: Generation) -> Option<OutputLine> {
        if !self.is_current(generation) || self.state != ConnectionState::Connecting {
            tracing::debug!("Ignoring stale open (generation {})", generation);
            return None;
        }

        if self.retry_count > 0 {
            tracing::info!("Reconnected after {} attempts", self.retry_count);
        } else {
            tracing::info!("Connected to {}", self.url);
        }

        self.state = ConnectionState::Open;
        self.retry_count = 0;
        self.opened_once = true;
        Some(OutputLine::success("Connected to backend"))
    }

    /// Record a transport error; never changes retry accounting
    pub fn on_error(&mut self, generation: Generation, error: &CoreError) -> Option<OutputLine> {
        if !self.is_current(generation) {
            tracing::debug!("Ignoring stale error (generation {}): {}", generation, error);
            return None;
        }

        if error.is_transport() {
            tracing::warn!("Transport error in state {}: {}", self.state, error);
        } else {
            tracing::error!("Connection failed in state {}: {}", self.state, error);
        }

        if !self.opened_once && !self.error_reported {
            self.error_reported = true;
            return Some(OutputLine::error(
                "Backend connection failed. Make sure the backend is running.",
            ));
        }
        None
    }

    pub fn on_close(&mut self, generation: Generation, effects: &mut Vec<Effect>) -> Option<OutputLine> {
        if !self.is_current(generation) || self.explicit_close {
            tracing::debug!("Ignoring close for generation {}", generation);
            return None;
        }
        if !matches!(self.state, ConnectionState::Connecting | ConnectionState::Open) {
            tracing::debug!("Duplicate close in state {}", self.state);
            return None;
        }

        if self.retry_count < self.policy.max_retries {
            self.retry_count += 1;
            self.state = ConnectionState::Reconnecting {
                attempt: self.retry_count,
            };
            self.reconnect_pending = true;
            effects.push(Effect::ScheduleReconnect {
                generation,
                delay: self.policy.delay,
            });

            tracing::warn!(
                "Connection lost, retrying in {:?} ({}/{})",
                self.policy.delay,
                self.retry_count,
                self.policy.max_retries
            );
            Some(OutputLine::warning(format!(
                "Connection lost. Reconnecting... ({}/{})",
                self.retry_count, self.policy.max_retries
            )))
        } else {
            self.state = ConnectionState::Closed;
            self.reconnect_pending = false;

            tracing::error!(
                "{}",
                CoreError::ExhaustedRetries {
                    attempts: self.policy.max_retries
                }
            );
            Some(OutputLine::error(format!(
                "Failed to connect to backend after {} attempts. Restart the session to retry.",
                self.policy.max_retries
            )))
        }
    }

    /// Reconnect delay elapsed
    pub fn on_reconnect_timer(&mut self, generation: Generation, effects: &mut Vec<Effect>) {
        if !self.is_current(generation) || !self.reconnect_pending || self.explicit_close {
            tracing::debug!("Ignoring stale reconnect timer (generation {})", generation);
            return;
        }
        self.reconnect_pending = false;

        if let ConnectionState::Reconnecting { attempt } = self.state {
            tracing::info!("Reconnect attempt {}/{}", attempt, self.policy.max_retries);
            self.dial(effects);
        }
    }

    /// Owner-initiated shutdown; suppresses all further reconnects
    pub fn close(&mut self, effects: &mut Vec<Effect>) -> Option<OutputLine> {
        if self.explicit_close {
            return None;
        }
        self.explicit_close = true;

        if self.reconnect_pending {
            self.reconnect_pending = false;
            effects.push(Effect::CancelReconnect);
        }
        if matches!(self.state, ConnectionState::Connecting | ConnectionState::Open) {
            effects.push(Effect::Disconnect {
                generation: self.generation,
            });
        }

        // Nothing from the old connection may act on the session after this
        self.generation += 1;
        self.state = ConnectionState::Closed;

        tracing::info!("Session closed by owner");
        Some(OutputLine::system("Session closed"))
    }

    /// Queue a frame if the connection is open
    ///
    /// Returns false (and logs) when not open; never fails otherwise.
    pub fn transmit(&self, frame: String, effects: &mut Vec<Effect>) -> Result<()> {
        if !self.can_send() {
            tracing::warn!("Dropping outbound frame: connection is {}", self.state);
            return Err(CoreError::NotConnected);
        }
        effects.push(Effect::Transmit {
            generation: self.generation,
            frame,
        });
        Ok(())
    }

    pub fn can_send(&self) -> bool {
        self.state == ConnectionState::Open && !self.explicit_close
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_explicitly_closed(&self) -> bool {
        self.explicit_close
    }

    pub fn has_pending_reconnect(&self) -> bool {
        self.reconnect_pending
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    fn dial(&mut self, effects: &mut Vec<Effect>) {
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        effects.push(Effect::Dial {
            generation: self.generation,
            url: self.url.clone(),
        });
    }
}
