
/// Bounded event queue.
pub mod queue;



/// Access trace output.
pub mod trace;
