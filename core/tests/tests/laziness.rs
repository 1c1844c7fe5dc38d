use lazytramp_tests::utils::{counted, on_small_stack};
use lazytramp_thunk::{Deferred, ForceError, ThunkState, sync, unsync};
use lazytramp_tramp::{MutualStep, Step, recipes::Parity, run_mutual_lazy, run_tail};
use pretty_assertions::assert_eq;
use std::{
    cell::Cell,
    rc::Rc,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

#[test]
fn unforced_thunk_never_runs() {
    let runs = Rc::new(Cell::new(0));
    let thunk = counted(&runs, "unused");
    assert_eq!(thunk.state(), ThunkState::Pending);
    drop(thunk);
    assert_eq!(runs.get(), 0);
}

#[test]
fn shared_thunk_runs_once() {
    let runs = Rc::new(Cell::new(0));
    let thunk = counted(&runs, 42u64);
    let a = thunk.clone();
    let b = thunk.clone();
    assert_eq!(a.force(), Ok(&42));
    assert_eq!(b.force(), Ok(&42));
    assert_eq!(runs.get(), 1);
    assert!(thunk.is_forced());
}

#[test]
fn nested_thunk_forces_to_a_value() {
    let runs = Rc::new(Cell::new(0));
    let inner = counted(&runs, 9u64);
    let outer = unsync::Thunk::defer(move || Deferred::Later(inner));
    assert_eq!(unsync::force(Deferred::Later(outer)), Ok(9));
    assert_eq!(runs.get(), 1);
}

#[test]
fn deep_thunk_chain_on_a_small_stack() {
    let forced = on_small_stack(|| {
        let mut thunk = unsync::Thunk::ready(1u64);
        for _ in 0..100_000 {
            let next = thunk;
            thunk = unsync::Thunk::defer(move || Deferred::Later(next));
        }
        thunk.force_into()
    });
    assert_eq!(forced, Ok(1));
}

#[test]
fn unforced_deep_chain_drops_on_a_small_stack() {
    let runs = on_small_stack(|| {
        let runs = Rc::new(Cell::new(0));
        let mut thunk = counted(&runs, 1u64);
        for _ in 0..100_000 {
            let next = thunk;
            thunk = unsync::Thunk::defer(move || Deferred::Later(next));
        }
        drop(thunk);
        runs.get()
    });
    assert_eq!(runs, 0);
}

#[test]
fn failure_is_shared_by_every_holder() {
    let thunk: unsync::Thunk<u64, &str> = unsync::Thunk::fallible(|| Err("unreachable host"));
    let mapped = thunk.map(|v| v + 1);
    assert_eq!(mapped.force(), Err(ForceError::Failed("unreachable host")));
    assert_eq!(thunk.state(), ThunkState::Failed);
}

#[test]
fn steps_force_only_what_they_consume() {
    let runs = Rc::new(Cell::new(0));
    let args: Vec<unsync::Thunk<u64>> = (0..100).map(|i| counted(&runs, i)).collect();
    // the first eight arguments are consumed, the rest never forced
    let total = run_tail(
        |i: usize| match i {
            | 8 => Step::Done(args[..8].iter().map(|t| *t.force().unwrap()).sum::<u64>()),
            | i => {
                args[i].force().unwrap();
                Step::Continue(i + 1)
            }
        },
        0,
    );
    assert_eq!(total, 28);
    assert_eq!(runs.get(), 8);
    assert!(args[8..].iter().all(|t| t.state() == ThunkState::Pending));
}

#[test]
fn lazy_mutual_entry() {
    let table = |name: &Parity, n: u64| match (name, n) {
        | (Parity::Even, 0) => MutualStep::Done(true),
        | (Parity::Odd, 0) => MutualStep::Done(false),
        | (Parity::Even, n) => MutualStep::ContinueWith(Parity::Odd, n - 1),
        | (Parity::Odd, n) => MutualStep::ContinueWith(Parity::Even, n - 1),
    };
    let entry = unsync::Thunk::new(|| (Parity::Odd, 7u64));
    assert_eq!(run_mutual_lazy(&table, entry), Ok(true));
}

#[test]
fn sync_thunk_shared_across_workers() {
    use rayon::prelude::*;

    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let base = sync::Thunk::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        (1..=1_000u64).sum::<u64>()
    });
    let derived: Vec<sync::Thunk<u64>> = (0..16u64).map(|k| base.map(move |v| v + k)).collect();
    let values: Vec<u64> = derived.par_iter().map(|t| *t.force().unwrap()).collect();
    assert_eq!(values, (0..16u64).map(|k| 500_500 + k).collect::<Vec<_>>());
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
