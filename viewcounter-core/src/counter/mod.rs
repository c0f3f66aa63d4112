/*
    Counter subsystem - replicated view counting state

    The CRDT itself (grow-only counter), the per-video store each
    replica owns, and the error types shared across the subsystem.
*/

pub mod errors;
pub mod g_counter;
pub mod store;

pub use errors::{CounterError, CounterResult};
pub use g_counter::{GCounter, ReplicaId};
pub use store::{CounterStore, VideoId};

#[cfg(test)]
mod tests;
