//! In-flight transaction tracking.
//!
//! Every request a core commits is recorded here under a fresh id until the memory
//! subsystem reports it complete. The table never holds more entries than its capacity;
//! callers check [`TransactionTable::has_room`] before issuing.

use std::collections::HashMap;

use crate::common::addr::PhysAddr;
use crate::common::data::AccessKind;
use crate::soc::traits::TransactionId;

/// One issued, not yet completed memory request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Id unique within the issuing core.
    pub id: TransactionId,
    /// Read or write.
    pub kind: AccessKind,
    /// Translated address.
    pub paddr: PhysAddr,
    /// Length in bytes.
    pub len: u32,
    /// Core cycle the request was committed in.
    pub issued_at: u64,
}

/// Pending-transaction set of one core.
#[derive(Debug, Clone)]
pub struct TransactionTable {
    entries: HashMap<TransactionId, PendingTransaction>,
    capacity: usize,
    next_id: u64,
}

impl TransactionTable {
    /// Creates an empty table admitting at most `capacity` transactions.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Maximum in-flight transactions.
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Transactions currently in flight.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is in flight.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `count` more transactions fit.
    #[inline]
    pub fn has_room(&self, count: usize) -> bool {
        self.entries.len() + count <= self.capacity
    }

    /// Records a new transaction under a fresh id.
    pub fn issue(
        &mut self,
        kind: AccessKind,
        paddr: PhysAddr,
        len: u32,
        issued_at: u64,
    ) -> PendingTransaction {
        let txn = PendingTransaction {
            id: TransactionId(self.next_id),
            kind,
            paddr,
            len,
            issued_at,
        };
        self.next_id += 1;
        let previous = self.entries.insert(txn.id, txn);
        debug_assert!(previous.is_none(), "transaction id {} reused", txn.id);
        txn
    }

    /// Retires the transaction with `id`, if it is in flight.
    pub fn complete(&mut self, id: TransactionId) -> Option<PendingTransaction> {
        self.entries.remove(&id)
    }

    /// Looks up an in-flight transaction.
    pub fn get(&self, id: TransactionId) -> Option<&PendingTransaction> {
        self.entries.get(&id)
    }

    /// In-flight transactions in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingTransaction> {
        self.entries.values()
    }
}
