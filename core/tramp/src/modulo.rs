//! Tail recursion modulo a post-processing operation.
//!
//! A recursion like `f(x) = g(x, f(next(x)))` is run in two passes. The forward pass
//! records `g(x, _)` as a [`PendingOp`] instead of waiting for `f(next(x))`; once the base
//! case answers, the unwind pass pops the recorded ops last-in first-out and feeds each
//! one the accumulated result. An op may answer [`Unwind::Stop`] to end the unwind early,
//! and the ops still recorded are dropped without being applied.
//!
//! An op receives exactly one accumulated value. A step that needs two unresolved
//! recursive results (`f(a) + f(b)`) cannot be written here and has to be reworked
//! into accumulator-passing form for [`run_tail`](crate::run_tail) first.

use crate::meter::{Meter, Unmetered, infallible};

/// What a pending op does with the accumulated result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unwind<R> {
    /// Hand the new accumulated value to the next op.
    Resume(R),
    /// Finish the whole run with this value.
    Stop(R),
}

/// A unary operation deferred until the recursive result is known.
pub struct PendingOp<'a, R>(Box<dyn FnOnce(R) -> Unwind<R> + 'a>);

impl<'a, R> PendingOp<'a, R> {
    pub fn new(op: impl FnOnce(R) -> Unwind<R> + 'a) -> Self {
        PendingOp(Box::new(op))
    }
    /// An op that never stops the unwind.
    pub fn map(op: impl FnOnce(R) -> R + 'a) -> Self {
        Self::new(move |acc| Unwind::Resume(op(acc)))
    }
    pub fn apply(self, acc: R) -> Unwind<R> {
        (self.0)(acc)
    }
}

pub enum ModuloStep<'a, S, R> {
    /// Base case.
    Done(R),
    /// Plain tail call; nothing to apply afterwards.
    Continue(S),
    /// Record the op, then continue with the state.
    CombineThenContinue(PendingOp<'a, R>, S),
}

pub fn run_modulo<'a, S, R>(step: impl FnMut(S) -> ModuloStep<'a, S, R>, init: S) -> R {
    infallible(drive_modulo(step, init, &mut Unmetered::default()))
}

pub fn drive_modulo<'a, S, R, M: Meter>(
    mut step: impl FnMut(S) -> ModuloStep<'a, S, R>, init: S, meter: &mut M,
) -> Result<R, M::Error> {
    let mut pending: Vec<PendingOp<'a, R>> = Vec::new();
    let mut state = init;
    let mut acc = loop {
        meter.tick()?;
        match step(state) {
            | ModuloStep::Done(out) => break out,
            | ModuloStep::Continue(next) => state = next,
            | ModuloStep::CombineThenContinue(op, next) => {
                pending.push(op);
                meter.park(1);
                state = next;
            }
        }
    };
    log::trace!("modulo forward pass done, unwinding {} pending op(s)", pending.len());
    while let Some(op) = pending.pop() {
        match op.apply(acc) {
            | Unwind::Resume(next) => acc = next,
            | Unwind::Stop(out) => {
                log::trace!("modulo unwind stopped early, {} op(s) skipped", pending.len());
                return Ok(out);
            }
        }
    }
    Ok(acc)
}
