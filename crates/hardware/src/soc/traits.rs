//! Memory subsystem interface.
//!
//! Cores hand translated requests to a [`MemorySubsystem`] fire-and-forget. The subsystem
//! reports each request back exactly once, in any order, through [`MemorySubsystem::tick`];
//! the driver routes every completion to the core named in it.

use std::fmt;

use crate::common::addr::PhysAddr;
use crate::common::data::AccessKind;

/// Identifier of an in-flight request, unique per issuing core.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A translated request committed by a core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemRequest {
    /// Issuing core.
    pub core: u32,
    /// Id the completion must carry back.
    pub id: TransactionId,
    /// Read or write.
    pub kind: AccessKind,
    /// Translated physical address.
    pub paddr: PhysAddr,
    /// Length in bytes; never crosses a cache line.
    pub len: u32,
}

/// Completion signal for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemResponse {
    /// Core that issued the request.
    pub core: u32,
    /// Id of the completed request.
    pub id: TransactionId,
}

impl From<&MemRequest> for MemResponse {
    fn from(req: &MemRequest) -> Self {
        Self {
            core: req.core,
            id: req.id,
        }
    }
}

/// The memory/cache hierarchy below the cores.
pub trait MemorySubsystem {
    /// Accepts a request. Must eventually produce exactly one completion for it.
    fn send_request(&mut self, request: MemRequest);

    /// Advances one cycle and appends the completions that became ready to `completed`.
    fn tick(&mut self, completed: &mut Vec<MemResponse>);

    /// Requests accepted but not yet completed.
    fn in_flight(&self) -> usize;
}

impl fmt::Debug for dyn MemorySubsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySubsystem")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl<M: MemorySubsystem + ?Sized> MemorySubsystem for Box<M> {
    fn send_request(&mut self, request: MemRequest) {
        (**self).send_request(request);
    }

    fn tick(&mut self, completed: &mut Vec<MemResponse>) {
        (**self).tick(completed);
    }

    fn in_flight(&self) -> usize {
        (**self).in_flight()
    }
}
