//! Bounded FIFO of decoded events.

use std::collections::VecDeque;

use crate::stream::Event;

/// Per-core event queue; never holds more than its bound.
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<Event>,
    bound: usize,
}

impl EventQueue {
    /// Creates an empty queue holding at most `bound` events.
    pub fn new(bound: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(bound),
            bound,
        }
    }

    /// Maximum number of events.
    #[inline]
    pub const fn bound(&self) -> usize {
        self.bound
    }

    /// Number of queued events.
    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns true if the queue is at its bound.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.events.len() >= self.bound
    }

    /// Appends an event, handing it back if the queue is full.
    ///
    /// # Errors
    ///
    /// Returns the rejected event when the queue is at its bound.
    pub fn push(&mut self, event: Event) -> Result<(), Event> {
        if self.is_full() {
            return Err(event);
        }
        self.events.push_back(event);
        Ok(())
    }

    /// Oldest event, if any.
    #[inline]
    pub fn front(&self) -> Option<&Event> {
        self.events.front()
    }

    /// Removes and returns the oldest event.
    #[inline]
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// Iterates from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}
