//! Command stream decoding.
//!
//! The traced application feeds each core a byte stream of tagged records. This module
//! turns that stream into [`Event`]s:
//! 1. **Opcodes:** The leading byte of every record.
//! 2. **Events:** The closed set of decoded event kinds.
//! 3. **Sources:** Pull-based byte sources with a bounded readiness poll.
//! 4. **Decoder:** A two-state machine (outside / inside an instruction block).
//! 5. **Encoder:** The producer side, used to build literal streams.

/// Protocol opcode constants.
pub mod opcodes;

/// Decoded event type.
pub mod event;

/// Byte sources the decoder pulls from.
pub mod source;

/// Record decoder state machine.
pub mod decoder;

/// Record encoder (producer side of the protocol).
pub mod encode;

pub use decoder::{DecoderState, StreamDecoder};
pub use encode::StreamBuilder;
pub use event::Event;
pub use source::{CommandSource, ReaderSource, SliceSource};

#[cfg(unix)]
pub use source::FdSource;
