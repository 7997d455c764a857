/// Allocation, release, translation, and pool selection.
pub mod address_space;

/// A single page pool.
pub mod level;
