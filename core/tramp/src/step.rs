use crate::tail::run_tail;

/// The result of one step: keep going with a new state, or stop with the answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step<S, R> {
    Continue(S),
    Done(R),
}

/// A state machine that is its own state.
///
/// `step` performs one transition and must not call `eval` itself; `eval` drives the
/// transitions to completion in constant stack space.
pub trait Eval: Sized {
    type Out;
    fn step(self) -> Step<Self, Self::Out>;
    fn eval(self) -> Self::Out {
        run_tail(Self::step, self)
    }
}
