//! Common recursions, each rewritten for the trampoline matching its shape.

use crate::{
    deferred::{Bounce, Chain},
    meter::infallible,
    modulo::{ModuloStep, PendingOp, Unwind, run_modulo},
    mutual::{MutualStep, run_mutual},
    step::Step,
    tail::run_tail,
};
use std::ops::ControlFlow;

/// `f(f(f(init, x0), x1), x2)...`, as a tail loop over `(index, accumulator)`.
pub fn fold_left<T, B>(items: &[T], init: B, mut f: impl FnMut(B, &T) -> B) -> B {
    run_tail(
        |(i, acc): (usize, B)| match items.get(i) {
            | Some(item) => Step::Continue((i + 1, f(acc, item))),
            | None => Step::Done(acc),
        },
        (0, init),
    )
}

/// `f(x0, f(x1, f(x2, ... init)))`; each `f(x, _)` waits as a pending op.
pub fn fold_right<T, B>(items: &[T], init: B, f: impl Fn(&T, B) -> B) -> B {
    try_fold_right(items, init, |item, acc| ControlFlow::Continue(f(item, acc)))
}

/// Like [`fold_right`], but `f` may break out of the unwind; the ops for the items to the
/// left of the break are never applied.
pub fn try_fold_right<T, B>(items: &[T], init: B, f: impl Fn(&T, B) -> ControlFlow<B, B>) -> B {
    let f = &f;
    run_modulo(
        |(i, init): (usize, B)| match items.get(i) {
            | Some(item) => ModuloStep::CombineThenContinue(
                PendingOp::new(move |acc| match f(item, acc) {
                    | ControlFlow::Continue(acc) => Unwind::Resume(acc),
                    | ControlFlow::Break(out) => Unwind::Stop(out),
                }),
                (i + 1, init),
            ),
            | None => ModuloStep::Done(init),
        },
        (0, init),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Parity {
    Even,
    Odd,
}

fn parity(name: &Parity, n: u64) -> MutualStep<Parity, u64, bool> {
    match (name, n) {
        | (Parity::Even, 0) => MutualStep::Done(true),
        | (Parity::Odd, 0) => MutualStep::Done(false),
        | (Parity::Even, n) => MutualStep::ContinueWith(Parity::Odd, n - 1),
        | (Parity::Odd, n) => MutualStep::ContinueWith(Parity::Even, n - 1),
    }
}

pub fn is_even(n: u64) -> bool {
    infallible(run_mutual(&parity, Parity::Even, n))
}

pub fn is_odd(n: u64) -> bool {
    infallible(run_mutual(&parity, Parity::Odd, n))
}

/// Compose `fs` left to right into a flat chain; run it with [`Chain::call`] and
/// [`run_deferred`](crate::run_deferred).
pub fn compose_all<A, F>(fs: impl IntoIterator<Item = F>) -> Chain<A>
where
    A: Clone + 'static,
    F: Fn(A) -> A + 'static,
{
    fs.into_iter().collect()
}

/// A left fold of `op` kept as a deferred chain and evaluated by the deferred driver.
pub fn fold_deferred<A: Clone + 'static>(
    init: A, items: impl IntoIterator<Item = A>, op: impl Fn(A, A) -> A + 'static,
) -> A {
    let chain = Chain::new().fold(move |lhs, rhs| Bounce::Done(op(lhs, rhs)), items);
    crate::run_deferred(chain.call(init))
}
