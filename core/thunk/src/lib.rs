#![allow(clippy::style)]

//! Deferred computations that are forced at most once.
//!
//! Two flavors are provided, following the split `once_cell` makes:
//!
//! - [`unsync::Thunk`] is `Rc`-shared and meant for a single thread.
//! - [`sync::Thunk`] is `Arc`-shared; the first thread to force it runs the producer
//!   while every other thread blocks until the outcome is recorded.
//!
//! A producer yields a [`Deferred`] value: either the result itself, or another thunk
//! to keep forcing. Forcing follows such chains iteratively and memoizes the fully
//! forced outcome in every thunk along the way. Dropping a chain that was never forced
//! is iterative as well.
//!
//! Thunks built from producers require `T: 'static` and `E: 'static`.

pub mod err;
pub mod deferred;
pub mod unsync;
pub mod sync;
mod guard;
mod reclaim;


pub use deferred::Deferred;
pub use err::*;

/// Observable lifecycle of a thunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThunkState {
    /// The producer has not been invoked yet.
    Pending,
    /// The producer is running right now.
    Evaluating,
    /// The memo holds a value.
    Forced,
    /// The memo holds a failure that every later force replays.
    Failed,
}
