#![allow(clippy::style)]

//! Trampoline drivers: recursion replaced by an explicit loop over heap-resident state.
//!
//! Pick the driver by the shape of the recursive step:
//!
//! | shape                                   | step type      | driver          |
//! |-----------------------------------------|----------------|-----------------|
//! | tail call                               | [`Step`]       | [`run_tail`]    |
//! | call wrapped by a post-processing op    | [`ModuloStep`] | [`run_modulo`]  |
//! | calls between several functions         | [`MutualStep`] | [`run_mutual`]  |
//! | composition whose invocation recurses   | [`Bounce`]     | [`run_deferred`]|
//!
//! Every driver also has a `drive_*` form that threads a [`Meter`] through the loop.

pub mod err;
pub mod meter;
pub mod step;
pub mod tail;
pub mod modulo;
pub mod mutual;
pub mod deferred;
pub mod recipes;


pub use deferred::{
    Bounce, Chain, DeferredNode, Stage, StageFn, compose, drive_deferred, run_deferred,
};
pub use err::*;
pub use meter::{Budget, Meter, Stats, Unmetered};
pub use modulo::{ModuloStep, PendingOp, Unwind, drive_modulo, run_modulo};
pub use mutual::{MutualStep, Registry, StepTable, drive_mutual, run_mutual, run_mutual_lazy};
pub use step::{Eval, Step};
pub use tail::{drive_tail, run_tail};
