//! Dropping unforced producers without recursion.
//!
//! A pending producer may own the next thunk of a chain, whose producer owns the next,
//! and so on; dropping the head would recurse once per link. Instead, a producer dropped
//! while another one is already being dropped on the same thread is queued, and the
//! outermost drop empties the queue in a loop.

use std::{any::Any, cell::RefCell};

thread_local! {
    static QUEUE: RefCell<Option<Vec<Box<dyn Any>>>> = const { RefCell::new(None) };
}

pub(crate) fn reclaim(garbage: Box<dyn Any>) {
    let claimed = QUEUE.try_with(|queue| {
        let mut queue = queue.borrow_mut();
        match queue.as_mut() {
            | Some(pending) => {
                pending.push(garbage);
                None
            }
            | None => {
                *queue = Some(Vec::new());
                Some(garbage)
            }
        }
    });
    let first = match claimed {
        | Ok(Some(first)) => first,
        // queued, or the thread is tearing down its locals and it was dropped in place
        | Ok(None) | Err(_) => return,
    };
    let _draining = Draining;
    drop(first);
    while let Some(next) = QUEUE.with(|queue| queue.borrow_mut().as_mut().and_then(Vec::pop)) {
        drop(next);
    }
}

/// Closes the queue once the outermost drop is done, also when a drop panics.
struct Draining;

impl Drop for Draining {
    fn drop(&mut self) {
        let rest = QUEUE.try_with(|queue| queue.borrow_mut().take());
        if let Ok(Some(rest)) = rest {
            drop(rest);
        }
    }
}
