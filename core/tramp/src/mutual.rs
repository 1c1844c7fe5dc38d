//! Mutual recursion across a fixed set of named step functions.

use crate::{
    err::TrampError,
    meter::{Meter, Unmetered},
};
use indexmap::IndexMap;
use lazytramp_thunk::unsync::Thunk;
use std::{convert::Infallible, fmt::Debug, hash::Hash};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutualStep<K, S, R> {
    Done(R),
    /// Stay in the current step function.
    Continue(S),
    /// Jump to the step function named `K`.
    ContinueWith(K, S),
}

/// Resolves a step function name and runs one step of it.
pub trait StepTable<K, S, R> {
    type Error;
    fn step(&self, name: &K, state: S) -> Result<MutualStep<K, S, R>, Self::Error>;
}

/// A closure dispatching on the name; with an enum of names the match is checked for
/// exhaustiveness at compile time.
impl<K, S, R, F> StepTable<K, S, R> for F
where
    F: Fn(&K, S) -> MutualStep<K, S, R>,
{
    type Error = Infallible;
    fn step(&self, name: &K, state: S) -> Result<MutualStep<K, S, R>, Infallible> {
        Ok(self(name, state))
    }
}

type StepFn<'a, K, S, R> = Box<dyn Fn(S) -> MutualStep<K, S, R> + 'a>;

/// Step functions registered under names known only at run time.
pub struct Registry<'a, K, S, R> {
    steps: IndexMap<K, StepFn<'a, K, S, R>>,
}

impl<'a, K: Hash + Eq, S, R> Registry<'a, K, S, R> {
    pub fn new() -> Self {
        Registry { steps: IndexMap::new() }
    }
    pub fn insert(&mut self, name: K, step: impl Fn(S) -> MutualStep<K, S, R> + 'a) {
        self.steps.insert(name, Box::new(step));
    }
    pub fn with(mut self, name: K, step: impl Fn(S) -> MutualStep<K, S, R> + 'a) -> Self {
        self.insert(name, step);
        self
    }
    pub fn names(&self) -> impl Iterator<Item = &K> {
        self.steps.keys()
    }
}

impl<'a, K: Hash + Eq, S, R> Default for Registry<'a, K, S, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K: Hash + Eq + Debug, S, R> StepTable<K, S, R> for Registry<'a, K, S, R> {
    type Error = TrampError;
    fn step(&self, name: &K, state: S) -> Result<MutualStep<K, S, R>, TrampError> {
        let step = self
            .steps
            .get(name)
            .ok_or_else(|| TrampError::UnknownStep { name: format!("{:?}", name) })?;
        Ok(step(state))
    }
}

/// Run cooperating step functions, starting in `name` with `state`, until one of them
/// answers `Done`.
pub fn run_mutual<K, S, R, T>(table: &T, name: K, state: S) -> Result<R, T::Error>
where
    K: Debug,
    T: StepTable<K, S, R>,
    T::Error: From<Infallible>,
{
    drive_mutual(table, name, state, &mut Unmetered::default())
}

/// Like [`run_mutual`], with the entry point itself deferred until the driver starts.
pub fn run_mutual_lazy<K, S, R, T, E>(table: &T, entry: Thunk<(K, S), E>) -> Result<R, TrampError>
where
    K: Debug + Clone,
    S: Clone,
    E: Clone + Debug,
    T: StepTable<K, S, R>,
    TrampError: From<T::Error>,
{
    let (name, state) =
        entry.force_into().map_err(|err| TrampError::Force(format!("{:?}", err)))?;
    drive_mutual(table, name, state, &mut Unmetered::default())
}

pub fn drive_mutual<K, S, R, T, M, E>(table: &T, name: K, state: S, meter: &mut M) -> Result<R, E>
where
    K: Debug,
    T: StepTable<K, S, R>,
    M: Meter,
    E: From<T::Error> + From<M::Error>,
{
    let mut current = name;
    let mut state = state;
    loop {
        meter.tick()?;
        state = match table.step(&current, state)? {
            | MutualStep::Done(out) => break Ok(out),
            | MutualStep::Continue(next) => next,
            | MutualStep::ContinueWith(name, next) => {
                log::trace!("mutual trampoline jumps to {:?}", name);
                current = name;
                next
            }
        };
    }
}
