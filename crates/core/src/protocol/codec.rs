//! JSON codec for WebSocket text frames

use crate::error::{CoreError, Result};
use crate::types::{InboundMessage, OutboundMessage, KNOWN_KINDS};
use serde_json::Value;

/// Maximum frame size (1MB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// A frame that parsed as a tagged JSON record
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedFrame {
    /// Tag is one the router dispatches
    Known(InboundMessage),
    /// Well-formed record with a tag nobody handles
    Unknown(String),
}

/// Message codec for serialization/deserialization
pub struct MessageCodec;

impl MessageCodec {
    /// Encode outbound message to a JSON text frame
    pub fn encode(msg: &OutboundMessage) -> Result<String> {
        let frame = serde_json::to_string(msg)?;

        if frame.len() > MAX_FRAME_SIZE {
            return Err(CoreError::MessageTooLarge {
                size: frame.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        Ok(frame)
    }

    /// Decode inbound text frame
    ///
    /// Errors mean the frame is not a tagged record at all, or a known
    /// tag carries a payload of the wrong shape.
    pub fn decode(frame: &str) -> Result<DecodedFrame> {
        if frame.len() > MAX_FRAME_SIZE {
            return Err(CoreError::MessageTooLarge {
                size: frame.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        let value: Value = serde_json::from_str(frame)?;
        let kind = Self::kind_of(&value)?;

        if !KNOWN_KINDS.contains(&kind.as_str()) {
            return Ok(DecodedFrame::Unknown(kind));
        }

        serde_json::from_value(value)
            .map(DecodedFrame::Known)
            .map_err(|e| CoreError::InvalidMessageFormat(format!("{}: {}", kind, e)))
    }

    fn kind_of(value: &Value) -> Result<String> {
        let object = value
            .as_object()
            .ok_or_else(|| CoreError::InvalidMessageFormat("frame is not a JSON object".into()))?;

        object
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| CoreError::InvalidMessageFormat("missing string `type` field".into()))
    }
}
