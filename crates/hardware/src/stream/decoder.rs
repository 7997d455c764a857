//! Command stream decoder.
//!
//! Records are decoded one at a time by a two-state machine:
//! - `Outside`: top-level records (`NOOP`, `START_INSTRUCTION`, `ISSUE_TLM_MAP`,
//!   `ISSUE_TLM_FREE`, `SWITCH_POOL`, `PERFORM_EXIT`).
//! - `InsideInstruction`: sub-records of an instruction block (`PERFORM_READ`,
//!   `PERFORM_WRITE`, `END_INSTRUCTION`).
//!
//! The state persists between calls, so a caller may stop in the middle of an
//! instruction block (for example when its queue is full) and resume later.

use std::io;
use std::time::Duration;

use super::event::Event;
use super::opcodes;
use super::source::CommandSource;
use crate::common::error::{SimError, SimResult};

/// Position of the decoder relative to instruction blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecoderState {
    /// Between records at top level.
    #[default]
    Outside,
    /// After `START_INSTRUCTION`, before the matching `END_INSTRUCTION`.
    InsideInstruction,
}

/// Incremental decoder for one core's command stream.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    state: DecoderState,
    records: u64,
}

impl StreamDecoder {
    /// Creates a decoder positioned at top level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current block state.
    pub const fn state(&self) -> DecoderState {
        self.state
    }

    /// Number of records consumed so far, block markers included.
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// Decodes exactly one record from `src`.
    ///
    /// The caller must have seen `src.poll` report readiness; this call blocks until the
    /// whole record is available.
    ///
    /// # Returns
    ///
    /// `Ok(Some(event))` for a record that produces an event, `Ok(None)` for the
    /// `START_INSTRUCTION` / `END_INSTRUCTION` markers.
    ///
    /// # Errors
    ///
    /// - [`SimError::UnknownOpcode`] for a byte not valid in the current state.
    /// - [`SimError::TruncatedRecord`] if the stream ends inside the record.
    /// - [`SimError::Io`] for any other read failure.
    pub fn decode_record<S>(&mut self, src: &mut S) -> SimResult<Option<Event>>
    where
        S: CommandSource + ?Sized,
    {
        let opcode = read_field::<S, 1>(src, 0)?[0];
        self.records += 1;

        let event = match self.state {
            DecoderState::Outside => match opcode {
                opcodes::NOOP => Some(Event::NoOp),
                opcodes::START_INSTRUCTION => {
                    self.state = DecoderState::InsideInstruction;
                    None
                }
                opcodes::ISSUE_TLM_MAP => Some(Event::Allocate {
                    virtual_address: read_u64(src, opcode)?,
                    length: read_u64(src, opcode)?,
                    level: read_u32(src, opcode)?,
                }),
                opcodes::ISSUE_TLM_FREE => Some(Event::Free {
                    virtual_address: read_u64(src, opcode)?,
                }),
                opcodes::SWITCH_POOL => Some(Event::SwitchPool {
                    level: read_u32(src, opcode)?,
                }),
                opcodes::PERFORM_EXIT => Some(Event::Exit),
                _ => {
                    return Err(SimError::UnknownOpcode {
                        opcode,
                        context: "top level",
                    });
                }
            },
            DecoderState::InsideInstruction => match opcode {
                opcodes::PERFORM_READ => Some(Event::Read {
                    address: read_u64(src, opcode)?,
                    length: read_u32(src, opcode)?,
                }),
                opcodes::PERFORM_WRITE => Some(Event::Write {
                    address: read_u64(src, opcode)?,
                    length: read_u32(src, opcode)?,
                }),
                opcodes::END_INSTRUCTION => {
                    self.state = DecoderState::Outside;
                    None
                }
                _ => {
                    return Err(SimError::UnknownOpcode {
                        opcode,
                        context: "inside instruction block",
                    });
                }
            },
        };

        Ok(event)
    }

    /// Decodes every record that is immediately available.
    ///
    /// # Errors
    ///
    /// Same as [`StreamDecoder::decode_record`].
    pub fn decode_available<S>(&mut self, src: &mut S) -> SimResult<Vec<Event>>
    where
        S: CommandSource + ?Sized,
    {
        let mut events = Vec::new();
        while src.poll(Duration::ZERO)? {
            if let Some(event) = self.decode_record(src)? {
                events.push(event);
            }
        }
        Ok(events)
    }
}

fn read_field<S, const N: usize>(src: &mut S, opcode: u8) -> SimResult<[u8; N]>
where
    S: CommandSource + ?Sized,
{
    let mut bytes = [0u8; N];
    src.read_exact(&mut bytes).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => SimError::TruncatedRecord { opcode },
        _ => SimError::Io(e),
    })?;
    Ok(bytes)
}

fn read_u64<S: CommandSource + ?Sized>(src: &mut S, opcode: u8) -> SimResult<u64> {
    read_field::<S, 8>(src, opcode).map(u64::from_ne_bytes)
}

fn read_u32<S: CommandSource + ?Sized>(src: &mut S, opcode: u8) -> SimResult<u32> {
    read_field::<S, 4>(src, opcode).map(u32::from_ne_bytes)
}
