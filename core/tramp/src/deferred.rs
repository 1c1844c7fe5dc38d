//! Deferred call trees.
//!
//! Composing stages naively, `compose(f, g) = |x| g(f(x))`, makes invoking the result
//! recurse once per composed stage, and dropping it recurse once per captured stage.
//! Here a [`Stage`] is a flat, shared list of [`DeferredNode`]s: composing two stages
//! concatenates their lists, so no stage ever owns another. A function answers with a
//! [`Bounce`] marker instead of calling the next stage itself, and [`run_deferred`]
//! keeps the nodes that still wait for a value on an explicit work list.
//!
//! Invoking a stage directly, without [`run_deferred`], only produces the first marker;
//! every invocation site has to go through the driver.

use crate::meter::{Meter, Unmetered, infallible};
use std::{fmt, rc::Rc};

/// A single unary function answering with a marker.
pub type StageFn<A> = Rc<dyn Fn(A) -> Bounce<A>>;

/// A binary operator applied to the running value and a fixed right-hand operand.
pub type Combinator<A> = Rc<dyn Fn(A, A) -> Bounce<A>>;

pub enum Bounce<A> {
    /// A plain value; nothing left to call.
    Done(A),
    /// Invoke the stage with the argument.
    Call(Stage<A>, A),
    /// Run the first computation, then feed its value through the nodes in order.
    Then(Box<Bounce<A>>, Vec<DeferredNode<A>>),
}

impl<A> Bounce<A> {
    pub fn call(stage: &Stage<A>, arg: A) -> Self {
        Bounce::Call(stage.clone(), arg)
    }
    pub fn then(self, node: DeferredNode<A>) -> Self {
        match self {
            | Bounce::Then(first, mut rest) => {
                rest.push(node);
                Bounce::Then(first, rest)
            }
            | first => Bounce::Then(Box::new(first), vec![node]),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for Bounce<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            | Bounce::Done(value) => f.debug_tuple("Done").field(value).finish(),
            | Bounce::Call(stage, arg) => {
                f.debug_struct("Call").field("arg", arg).field("nodes", &stage.len()).finish()
            }
            | Bounce::Then(first, rest) => {
                f.debug_struct("Then").field("first", first).field("nodes", &rest.len()).finish()
            }
        }
    }
}

/// One link of a composition chain, waiting for the value on its left.
pub enum DeferredNode<A> {
    /// Feed the value into a function.
    Apply(StageFn<A>),
    /// Combine the value with a right-hand operand.
    Combine(Combinator<A>, A),
}

impl<A: Clone> Clone for DeferredNode<A> {
    fn clone(&self) -> Self {
        match self {
            | DeferredNode::Apply(f) => DeferredNode::Apply(f.clone()),
            | DeferredNode::Combine(op, rhs) => DeferredNode::Combine(op.clone(), rhs.clone()),
        }
    }
}

impl<A> DeferredNode<A> {
    pub fn apply(self, lhs: A) -> Bounce<A> {
        match self {
            | DeferredNode::Apply(f) => f(lhs),
            | DeferredNode::Combine(op, rhs) => op(lhs, rhs),
        }
    }
}

/// A shared, immutable composition of nodes, applied left to right.
pub struct Stage<A>(Rc<Vec<DeferredNode<A>>>);

impl<A> Clone for Stage<A> {
    fn clone(&self) -> Self {
        Stage(self.0.clone())
    }
}

impl<A> Stage<A> {
    pub fn new(f: impl Fn(A) -> Bounce<A> + 'static) -> Self {
        Stage(Rc::new(vec![DeferredNode::Apply(Rc::new(f))]))
    }
    pub fn map(f: impl Fn(A) -> A + 'static) -> Self {
        Self::new(move |arg| Bounce::Done(f(arg)))
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<A: Clone> Stage<A> {
    /// Apply the first function to `arg` and leave the rest of the stage as a marker.
    pub fn invoke(&self, arg: A) -> Bounce<A> {
        match self.0.split_first() {
            | None => Bounce::Done(arg),
            | Some((first, [])) => first.clone().apply(arg),
            | Some((first, rest)) => {
                Bounce::Then(Box::new(first.clone().apply(arg)), rest.to_vec())
            }
        }
    }
}

/// Composes two stages without invoking either: `f` runs first, then `g`.
///
/// The node lists are concatenated, extending `f`'s in place when it is not shared, so
/// folding `compose` over many stages stays linear and leaves a flat list behind.
pub fn compose<A: Clone>(f: Stage<A>, g: Stage<A>) -> Stage<A> {
    let mut nodes = Rc::try_unwrap(f.0).unwrap_or_else(|shared| (*shared).clone());
    nodes.extend(g.0.iter().cloned());
    Stage(Rc::new(nodes))
}

/// A composition kept as a flat, ordered list of nodes.
pub struct Chain<A> {
    nodes: Vec<DeferredNode<A>>,
}

impl<A> Default for Chain<A> {
    fn default() -> Self {
        Chain { nodes: Vec::new() }
    }
}

impl<A: Clone + 'static> Chain<A> {
    pub fn new() -> Self {
        Self::default()
    }
    /// Append a stage answering with a marker.
    pub fn then(mut self, stage: impl Fn(A) -> Bounce<A> + 'static) -> Self {
        self.nodes.push(DeferredNode::Apply(Rc::new(stage)));
        self
    }
    /// Append a plain function as a stage.
    pub fn then_map(self, f: impl Fn(A) -> A + 'static) -> Self {
        self.then(move |arg| Bounce::Done(f(arg)))
    }
    /// Append `op(_, rhs)` for every item, in order: a left fold of `op` over `items`
    /// that runs once the chain is called with the initial accumulator.
    pub fn fold(
        mut self, op: impl Fn(A, A) -> Bounce<A> + 'static, items: impl IntoIterator<Item = A>,
    ) -> Self {
        let op: Combinator<A> = Rc::new(op);
        self.nodes.extend(items.into_iter().map(|rhs| DeferredNode::Combine(op.clone(), rhs)));
        self
    }
    pub fn append(mut self, mut other: Chain<A>) -> Self {
        self.nodes.append(&mut other.nodes);
        self
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    /// The marker that runs the whole chain on `arg`.
    pub fn call(&self, arg: A) -> Bounce<A> {
        Bounce::Then(Box::new(Bounce::Done(arg)), self.nodes.clone())
    }
    /// The chain as a single stage, so it can be composed further.
    pub fn into_stage(self) -> Stage<A> {
        Stage(Rc::new(self.nodes))
    }
}

impl<A: Clone + 'static, F: Fn(A) -> A + 'static> FromIterator<F> for Chain<A> {
    fn from_iter<I: IntoIterator<Item = F>>(iter: I) -> Self {
        iter.into_iter().fold(Chain::new(), |chain, f| chain.then_map(f))
    }
}

/// Resolve markers until a plain value comes out.
pub fn run_deferred<A: Clone>(start: Bounce<A>) -> A {
    infallible(drive_deferred(start, &mut Unmetered::default()))
}

pub fn drive_deferred<A: Clone, M: Meter>(
    start: Bounce<A>, meter: &mut M,
) -> Result<A, M::Error> {
    // top of the stack is the node to apply next
    let mut work: Vec<DeferredNode<A>> = Vec::new();
    let mut current = start;
    loop {
        current = match current {
            | Bounce::Call(stage, arg) => {
                meter.park(stage.len());
                work.extend(stage.0.iter().rev().cloned());
                Bounce::Done(arg)
            }
            | Bounce::Then(first, nodes) => {
                meter.park(nodes.len());
                work.extend(nodes.into_iter().rev());
                *first
            }
            | Bounce::Done(value) => match work.pop() {
                | Some(node) => {
                    meter.tick()?;
                    node.apply(value)
                }
                | None => break Ok(value),
            },
        };
    }
}
