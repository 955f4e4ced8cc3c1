//! Wire codec

mod codec;

pub use codec::{DecodedFrame, MessageCodec, MAX_FRAME_SIZE};
