//! Command stream encoder.
//!
//! Builds byte streams in the same format the decoder consumes. Tools that generate
//! synthetic traces and the test suite use it to avoid hand-writing byte literals.

use super::event::Event;
use super::opcodes;

/// Fluent builder for a command stream.
///
/// # Examples
///
/// ```
/// use tracesim_core::stream::{Event, SliceSource, StreamBuilder, StreamDecoder};
///
/// let bytes = StreamBuilder::new()
///     .allocate(0x1000, 4096, 0)
///     .instruction(&[Event::Read { address: 0x1000, length: 8 }])
///     .exit()
///     .build();
///
/// let mut src = SliceSource::new(bytes);
/// let events = StreamDecoder::new().decode_available(&mut src).unwrap();
/// assert_eq!(events.len(), 3);
/// assert_eq!(events[2], Event::Exit);
/// ```
#[derive(Debug, Default, Clone)]
pub struct StreamBuilder {
    bytes: Vec<u8>,
}

impl StreamBuilder {
    /// Creates an empty stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw byte, valid or not.
    #[must_use]
    pub fn raw(mut self, byte: u8) -> Self {
        self.bytes.push(byte);
        self
    }

    /// Appends a `NOOP` record.
    #[must_use]
    pub fn noop(self) -> Self {
        self.raw(opcodes::NOOP)
    }

    /// Appends a `START_INSTRUCTION` marker.
    #[must_use]
    pub fn begin_instruction(self) -> Self {
        self.raw(opcodes::START_INSTRUCTION)
    }

    /// Appends an `END_INSTRUCTION` marker.
    #[must_use]
    pub fn end_instruction(self) -> Self {
        self.raw(opcodes::END_INSTRUCTION)
    }

    /// Appends a `PERFORM_READ` sub-record.
    #[must_use]
    pub fn read(self, address: u64, length: u32) -> Self {
        self.raw(opcodes::PERFORM_READ).u64(address).u32(length)
    }

    /// Appends a `PERFORM_WRITE` sub-record.
    #[must_use]
    pub fn write(self, address: u64, length: u32) -> Self {
        self.raw(opcodes::PERFORM_WRITE).u64(address).u32(length)
    }

    /// Appends a whole instruction block holding the reads and writes in `accesses`.
    ///
    /// Events other than `Read` and `Write` are skipped.
    #[must_use]
    pub fn instruction(self, accesses: &[Event]) -> Self {
        let body = accesses.iter().fold(self.begin_instruction(), |b, ev| match *ev {
            Event::Read { address, length } => b.read(address, length),
            Event::Write { address, length } => b.write(address, length),
            _ => b,
        });
        body.end_instruction()
    }

    /// Appends an `ISSUE_TLM_MAP` record.
    #[must_use]
    pub fn allocate(self, virtual_address: u64, length: u64, level: u32) -> Self {
        self.raw(opcodes::ISSUE_TLM_MAP)
            .u64(virtual_address)
            .u64(length)
            .u32(level)
    }

    /// Appends an `ISSUE_TLM_FREE` record.
    #[must_use]
    pub fn free(self, virtual_address: u64) -> Self {
        self.raw(opcodes::ISSUE_TLM_FREE).u64(virtual_address)
    }

    /// Appends a `SWITCH_POOL` record.
    #[must_use]
    pub fn switch_pool(self, level: u32) -> Self {
        self.raw(opcodes::SWITCH_POOL).u32(level)
    }

    /// Appends a `PERFORM_EXIT` record.
    #[must_use]
    pub fn exit(self) -> Self {
        self.raw(opcodes::PERFORM_EXIT)
    }

    /// Appends the record for one event; reads and writes get their own block.
    #[must_use]
    pub fn event(self, event: &Event) -> Self {
        match *event {
            Event::NoOp => self.noop(),
            Event::Read { .. } | Event::Write { .. } => self.instruction(std::slice::from_ref(event)),
            Event::Allocate {
                virtual_address,
                length,
                level,
            } => self.allocate(virtual_address, length, level),
            Event::Free { virtual_address } => self.free(virtual_address),
            Event::SwitchPool { level } => self.switch_pool(level),
            Event::Exit => self.exit(),
        }
    }

    /// Appends every record of another stream.
    #[must_use]
    pub fn append(mut self, other: Self) -> Self {
        self.bytes.extend(other.bytes);
        self
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Finishes the stream.
    pub fn build(self) -> Vec<u8> {
        self.bytes
    }

    fn u64(mut self, value: u64) -> Self {
        self.bytes.extend_from_slice(&value.to_ne_bytes());
        self
    }

    fn u32(mut self, value: u32) -> Self {
        self.bytes.extend_from_slice(&value.to_ne_bytes());
        self
    }
}
