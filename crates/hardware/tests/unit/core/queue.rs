//! Event Queue Tests.

use tracesim_core::core::queue::EventQueue;
use tracesim_core::stream::Event;

#[test]
fn fifo_order() {
    let mut q = EventQueue::new(4);
    q.push(Event::NoOp).unwrap();
    q.push(Event::Exit).unwrap();
    assert_eq!(q.front(), Some(&Event::NoOp));
    assert_eq!(q.pop(), Some(Event::NoOp));
    assert_eq!(q.pop(), Some(Event::Exit));
    assert_eq!(q.pop(), None);
}

#[test]
fn push_beyond_bound_is_rejected() {
    let mut q = EventQueue::new(2);
    q.push(Event::NoOp).unwrap();
    q.push(Event::NoOp).unwrap();
    assert!(q.is_full());
    assert_eq!(q.push(Event::Exit), Err(Event::Exit));
    assert_eq!(q.len(), 2);
    assert_eq!(q.bound(), 2);
}

#[test]
fn iter_follows_queue_order() {
    let mut q = EventQueue::new(3);
    q.push(Event::SwitchPool { level: 0 }).unwrap();
    q.push(Event::NoOp).unwrap();
    let seen: Vec<Event> = q.iter().copied().collect();
    assert_eq!(seen, vec![Event::SwitchPool { level: 0 }, Event::NoOp]);
    assert!(!q.is_empty());
}
