//! Single-threaded thunks.

use crate::{Deferred, ForceError, Outcome, ThunkState, guard::guard, reclaim::reclaim};
use once_cell::unsync::OnceCell;
use std::{cell::RefCell, convert::Infallible, fmt, rc::Rc};

/// What a producer hands back: the value, or another thunk to keep forcing.
pub type Lazy<T, E = Infallible> = Deferred<T, Thunk<T, E>>;

type Producer<T, E> = Box<dyn FnOnce() -> Result<Lazy<T, E>, ForceError<E>>>;

enum Slot<T, E> {
    Pending(Producer<T, E>),
    Evaluating,
    Settled,
}

struct Inner<T, E> {
    slot: RefCell<Slot<T, E>>,
    memo: OnceCell<Outcome<T, E>>,
    /// Hands a producer that was never run over to [`reclaim`].
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

/// A shared, memoizing deferred computation.
///
/// Cloning a `Thunk` clones the handle, not the computation: every clone observes the
/// same memo, and the producer runs at most once across all of them.
pub struct Thunk<T, E = Infallible>(Rc<Inner<T, E>>);

impl<T, E> Clone for Thunk<T, E> {
    fn clone(&self) -> Self {
        Thunk(self.0.clone())
    }
}

impl<T: 'static, E: 'static> Thunk<T, E> {
    /// Defer `producer` until the first force.
    pub fn make(producer: impl FnOnce() -> Result<Lazy<T, E>, ForceError<E>> + 'static) -> Self {
        Thunk(Rc::new(Inner {
            slot: RefCell::new(Slot::Pending(Box::new(producer))),
            memo: OnceCell::new(),
            stash: stash::<T, E>,
        }))
    }
    /// Defer a computation that may fail with `E`.
    pub fn fallible(producer: impl FnOnce() -> Result<T, E> + 'static) -> Self {
        Self::make(move || producer().map(Deferred::Now).map_err(ForceError::Failed))
    }
}

impl<T, E> Thunk<T, E> {
    /// A thunk that has already failed with `err`.
    pub fn failed(err: E) -> Self {
        Self::settled(Err(ForceError::Failed(err)))
    }
    fn settled(outcome: Outcome<T, E>) -> Self {
        Thunk(Rc::new(Inner {
            slot: RefCell::new(Slot::Settled),
            memo: OnceCell::with_value(outcome),
            stash: |_| {},
        }))
    }

    pub fn state(&self) -> ThunkState {
        match self.0.memo.get() {
            | Some(Ok(_)) => ThunkState::Forced,
            | Some(Err(_)) => ThunkState::Failed,
            | None => match &*self.0.slot.borrow() {
                | Slot::Pending(_) => ThunkState::Pending,
                | Slot::Evaluating | Slot::Settled => ThunkState::Evaluating,
            },
        }
    }
    pub fn is_forced(&self) -> bool {
        self.0.memo.get().is_some()
    }
    /// Whether two handles share the same cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: 'static> Thunk<T> {
    /// Defer an infallible computation of a plain value.
    pub fn new(producer: impl FnOnce() -> T + 'static) -> Self {
        Self::make(move || Ok(Deferred::Now(producer())))
    }
    /// Defer a computation that may answer with yet another thunk.
    pub fn defer(producer: impl FnOnce() -> Lazy<T> + 'static) -> Self {
        Self::make(move || Ok(producer()))
    }
    /// A thunk whose memo is already populated.
    pub fn ready(value: T) -> Self {
        Self::settled(Ok(value))
    }
}

impl<T: Clone, E: Clone> Thunk<T, E> {
    /// Force the thunk, running its producer if nobody has yet.
    ///
    /// The returned reference points into the memo, so every force of the same thunk
    /// yields the very same value.
    pub fn force(&self) -> Result<&T, ForceError<E>> {
        if self.0.memo.get().is_none() {
            let settled = self.settle();
            // a cycle reported to a nested force leaves our own memo empty
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

    /// Force the thunk and take the value out, moving it when this is the last handle.
    pub fn force_into(self) -> Outcome<T, E> {
        self.force()?;
        match Rc::try_unwrap(self.0) {
            | Ok(mut inner) => inner.memo.take().unwrap_or(Err(ForceError::Cycle)),
            | Err(shared) => shared.memo.get().cloned().unwrap_or(Err(ForceError::Cycle)),
        }
    }

    /// A new thunk applying `f` to this one's value; forcing it forces this one.
    pub fn map<U, F>(&self, f: F) -> Thunk<U, E>
    where
        T: 'static,
        E: 'static,
        U: 'static,
        F: FnOnce(&T) -> U + 'static,
    {
        let source = self.clone();
        Thunk::make(move || Ok(Deferred::Now(f(source.force()?))))
    }

    /// Follow the producer chain starting at `self` with a heap work list, then write the
    /// final outcome into every link that was run.
    fn settle(&self) -> Outcome<(), E> {
        let mut chain: Vec<Thunk<T, E>> = Vec::new();
        let mut current = self.clone();
        let outcome = loop {
            if let Some(memo) = current.0.memo.get() {
                break memo.clone();
            }
            let taken = std::mem::replace(&mut *current.0.slot.borrow_mut(), Slot::Evaluating);
            let producer = match taken {
                | Slot::Pending(producer) => producer,
                | slot @ (Slot::Evaluating | Slot::Settled) => {
                    *current.0.slot.borrow_mut() = slot;
                    log::debug!("cycle detected while forcing a thunk");
                    break Err(ForceError::Cycle);
                }
            };
            chain.push(current.clone());
            match guard(producer) {
                | Ok(Ok(Deferred::Now(value))) => break Ok(value),
                | Ok(Ok(Deferred::Later(next))) => current = next,
                | Ok(Err(err)) => break Err(err),
                | Err(message) => {
                    log::warn!("thunk producer panicked: {}", message);
                    break Err(ForceError::Panicked(message));
                }
            }
        };
        log::trace!("thunk settled through {} link(s)", chain.len());
        for link in chain {
            *link.0.slot.borrow_mut() = Slot::Settled;
            let _ = link.0.memo.set(outcome.clone());
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

/// Strict evaluation of a possibly deferred value.
///
/// A value that is already available is returned unchanged; a thunk is forced.
pub fn force<T: Clone, E: Clone>(value: Lazy<T, E>) -> Outcome<T, E> {
    match value {
        | Deferred::Now(value) => Ok(value),
        | Deferred::Later(thunk) => thunk.force_into(),
    }
}
