//! Connection lifecycle and WebSocket transport
//!
//! The lifecycle logic is I/O-free: [`ConnectionManager`] consumes
//! open/close/error/timer events and asks for work by pushing [`Effect`]s,
//! which the session runtime executes against the real socket and timers.
//! Every effect and event is tagged with the dial [`Generation`] it belongs
//! to so that callbacks from a superseded connection are dropped.

pub mod poll;
pub mod reconnect;
pub mod ws;

pub use poll::StatsPoller;
pub use reconnect::{ConnectionManager, ConnectionState, ReconnectPolicy};
pub use ws::{FrameReceiver, FrameSender};

use std::time::Duration;

/// Identity of one dial attempt
pub type Generation = u64;

/// Work requested from the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open a new connection
    Dial { generation: Generation, url: String },
    /// Write one text frame on the connection of `generation`
    Transmit { generation: Generation, frame: String },
    /// Arm the reconnect timer
    ScheduleReconnect {
        generation: Generation,
        delay: Duration,
    },
    /// Disarm the reconnect timer
    CancelReconnect,
    /// Tear down the connection of `generation`
    Disconnect { generation: Generation },
}
