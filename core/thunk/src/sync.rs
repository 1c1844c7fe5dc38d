//! Thread-safe thunks.
//!
//! Each thunk carries its own lock. The first thread to find the memo empty claims the
//! producer and runs it outside the lock; any other thread forcing the same thunk parks
//! on the thunk's condition variable until the outcome, value or failure, is recorded.
//! Forcing a thunk again from the thread that is already running its producer reports
//! [`ForceError::Cycle`]; a cycle spanning several threads is not detected.

use crate::{Deferred, ForceError, Outcome, ThunkState, guard::guard, reclaim::reclaim};
use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};
use std::{
    convert::Infallible,
    fmt,
    sync::Arc,
    thread::{self, ThreadId},
};

pub type Lazy<T, E = Infallible> = Deferred<T, Thunk<T, E>>;

type Producer<T, E> = Box<dyn FnOnce() -> Result<Lazy<T, E>, ForceError<E>> + Send>;

enum Slot<T, E> {
    Pending(Producer<T, E>),
    Evaluating(ThreadId),
    Settled,
}

struct Inner<T, E> {
    slot: Mutex<Slot<T, E>>,
    settled: Condvar,
    memo: OnceCell<Outcome<T, E>>,
    stash: fn(&mut Slot<T, E>),
}

impl<T, E> Drop for Inner<T, E> {
    fn drop(&mut self) {
        (self.stash)(self.slot.get_mut())
    }
}

fn stash<T: 'static, E: 'static>(slot: &mut Slot<T, E>) {
    if let Slot::Pending(producer) = std::mem::replace(slot, Slot::Settled) {
        reclaim(Box::new(producer));
    }
}

enum Claim<T, E> {
    Run(Producer<T, E>),
    Settled(Outcome<T, E>),
    Cycle,
}

/// An `Arc`-shared memoizing deferred computation.
pub struct Thunk<T, E = Infallible>(Arc<Inner<T, E>>);

impl<T, E> Clone for Thunk<T, E> {
    fn clone(&self) -> Self {
        Thunk(self.0.clone())
    }
}

impl<T: 'static, E: 'static> Thunk<T, E> {
    pub fn make(
        producer: impl FnOnce() -> Result<Lazy<T, E>, ForceError<E>> + Send + 'static,
    ) -> Self {
        Thunk(Arc::new(Inner {
            slot: Mutex::new(Slot::Pending(Box::new(producer))),
            settled: Condvar::new(),
            memo: OnceCell::new(),
            stash: stash::<T, E>,
        }))
    }
    pub fn fallible(producer: impl FnOnce() -> Result<T, E> + Send + 'static) -> Self {
        Self::make(move || producer().map(Deferred::Now).map_err(ForceError::Failed))
    }
}

impl<T, E> Thunk<T, E> {
    pub fn failed(err: E) -> Self {
        Self::settled(Err(ForceError::Failed(err)))
    }
    fn settled(outcome: Outcome<T, E>) -> Self {
        Thunk(Arc::new(Inner {
            slot: Mutex::new(Slot::Settled),
            settled: Condvar::new(),
            memo: OnceCell::with_value(outcome),
            stash: |_| {},
        }))
    }

    pub fn state(&self) -> ThunkState {
        match self.0.memo.get() {
            | Some(Ok(_)) => ThunkState::Forced,
            | Some(Err(_)) => ThunkState::Failed,
            | None => match &*self.0.slot.lock() {
                | Slot::Pending(_) => ThunkState::Pending,
                | Slot::Evaluating(_) | Slot::Settled => ThunkState::Evaluating,
            },
        }
    }
    pub fn is_forced(&self) -> bool {
        self.0.memo.get().is_some()
    }
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Take the producer, or wait for whoever took it first.
    fn claim(&self) -> Claim<T, E>
    where
        T: Clone,
        E: Clone,
    {
        let me = thread::current().id();
        let mut slot = self.0.slot.lock();
        loop {
            match std::mem::replace(&mut *slot, Slot::Settled) {
                | Slot::Pending(producer) => {
                    *slot = Slot::Evaluating(me);
                    return Claim::Run(producer);
                }
                | Slot::Evaluating(owner) => {
                    *slot = Slot::Evaluating(owner);
                    if owner == me {
                        return Claim::Cycle;
                    }
                    self.0.settled.wait(&mut slot);
                }
                | Slot::Settled => {
                    return match self.0.memo.get() {
                        | Some(outcome) => Claim::Settled(outcome.clone()),
                        | None => Claim::Cycle,
                    };
                }
            }
        }
    }

    /// Record the outcome and wake every waiter.
    fn publish(&self, outcome: Outcome<T, E>) {
        let _ = self.0.memo.set(outcome);
        *self.0.slot.lock() = Slot::Settled;
        self.0.settled.notify_all();
    }
}

impl<T: 'static> Thunk<T> {
    pub fn new(producer: impl FnOnce() -> T + Send + 'static) -> Self {
        Self::make(move || Ok(Deferred::Now(producer())))
    }
    pub fn defer(producer: impl FnOnce() -> Lazy<T> + Send + 'static) -> Self {
        Self::make(move || Ok(producer()))
    }
    pub fn ready(value: T) -> Self {
        Self::settled(Ok(value))
    }
}

impl<T: Clone, E: Clone> Thunk<T, E> {
    /// Force the thunk, blocking while another thread runs its producer.
    pub fn force(&self) -> Result<&T, ForceError<E>> {
        if self.0.memo.get().is_none() {
            let settled = self.settle();
            if let (None, Err(err)) = (self.0.memo.get(), settled) {
                return Err(err);
            }
        }
        match self.0.memo.get() {
            | Some(Ok(value)) => Ok(value),
            | Some(Err(err)) => Err(err.clone()),
            | None => Err(ForceError::Cycle),
        }
    }

    pub fn force_into(self) -> Outcome<T, E> {
        self.force()?;
        match Arc::try_unwrap(self.0) {
            | Ok(mut inner) => inner.memo.take().unwrap_or(Err(ForceError::Cycle)),
            | Err(shared) => shared.memo.get().cloned().unwrap_or(Err(ForceError::Cycle)),
        }
    }

    pub fn map<U, F>(&self, f: F) -> Thunk<U, E>
    where
        T: Send + Sync + 'static,
        E: Send + Sync + 'static,
        U: 'static,
        F: FnOnce(&T) -> U + Send + 'static,
    {
        let source = self.clone();
        Thunk::make(move || Ok(Deferred::Now(f(source.force()?))))
    }

    fn settle(&self) -> Outcome<(), E> {
        let mut chain: Vec<Thunk<T, E>> = Vec::new();
        let mut current = self.clone();
        let outcome = loop {
            let producer = match current.claim() {
                | Claim::Run(producer) => producer,
                | Claim::Settled(outcome) => break outcome,
                | Claim::Cycle => {
                    log::debug!("cycle detected while forcing a shared thunk");
                    break Err(ForceError::Cycle);
                }
            };
            chain.push(current.clone());
            match guard(producer) {
                | Ok(Ok(Deferred::Now(value))) => break Ok(value),
                | Ok(Ok(Deferred::Later(next))) => current = next,
                | Ok(Err(err)) => break Err(err),
                | Err(message) => {
                    log::warn!("shared thunk producer panicked: {}", message);
                    break Err(ForceError::Panicked(message));
                }
            }
        };
        log::trace!("shared thunk settled through {} link(s)", chain.len());
        for link in chain {
            link.publish(outcome.clone());
        }
        outcome.map(|_| ())
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Thunk<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.memo.get() {
            | Some(outcome) => f.debug_tuple("Thunk").field(outcome).finish(),
            | None => f.write_str("Thunk(<unforced>)"),
        }
    }
}

pub fn force<T: Clone, E: Clone>(value: Lazy<T, E>) -> Outcome<T, E> {
    match value {
        | Deferred::Now(value) => Ok(value),
        | Deferred::Later(thunk) => thunk.force_into(),
    }
}
