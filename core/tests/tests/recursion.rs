use lazytramp_tests::{agrees_with_recursion, survives_depth};
use lazytramp_tramp::{
    Bounce, Chain, ModuloStep, MutualStep, PendingOp, Stage, Step, compose, recipes::*,
    run_deferred, run_modulo, run_mutual, run_tail,
};
use pretty_assertions::assert_eq;
use std::ops::ControlFlow;

fn sum(n: u64) -> u64 {
    match n {
        | 0 => 0,
        | n => n + sum(n - 1),
    }
}

fn sub_right(items: &[i64]) -> i64 {
    match items {
        | [] => 0,
        | [x, rest @ ..] => x - sub_right(rest),
    }
}

fn even(n: u64) -> bool {
    match n {
        | 0 => true,
        | n => odd(n - 1),
    }
}

fn odd(n: u64) -> bool {
    match n {
        | 0 => false,
        | n => even(n - 1),
    }
}

fn tail_sum(n: u64) -> u64 {
    run_tail(
        |(n, acc): (u64, u64)| match n {
            | 0 => Step::Done(acc),
            | n => Step::Continue((n - 1, acc + n)),
        },
        (n, 0),
    )
}

fn modulo_sum(n: u64) -> u64 {
    run_modulo(
        |n: u64| match n {
            | 0 => ModuloStep::Done(0),
            | n => ModuloStep::CombineThenContinue(PendingOp::map(move |acc| n + acc), n - 1),
        },
        n,
    )
}

/* ---------------------------- Small inputs agree --------------------------- */

agrees_with_recursion!(tail_sum_agrees, tail_sum(1_000), sum(1_000));
agrees_with_recursion!(modulo_sum_agrees, modulo_sum(1_000), sum(1_000));
agrees_with_recursion!(
    right_fold_agrees,
    fold_right(&[1i64, 2, 3, 4, 5], 0, |x, acc| x - acc),
    sub_right(&[1, 2, 3, 4, 5])
);
agrees_with_recursion!(
    left_fold_agrees,
    fold_left(&[1i64, 2, 3, 4, 5], 0, |acc, x| acc - x),
    [1i64, 2, 3, 4, 5].iter().fold(0, |acc, x| acc - x)
);
agrees_with_recursion!(
    even_agrees,
    (0..200).map(is_even).collect::<Vec<_>>(),
    (0..200).map(even).collect::<Vec<_>>()
);
agrees_with_recursion!(
    odd_agrees,
    (0..200).map(is_odd).collect::<Vec<_>>(),
    (0..200).map(odd).collect::<Vec<_>>()
);
agrees_with_recursion!(
    deferred_fold_agrees,
    fold_deferred(100i64, 1..=5, |acc, x| acc - x),
    100 - 1 - 2 - 3 - 4 - 5
);

/* ----------------------- Deep inputs on a small stack ---------------------- */

survives_depth!(tail_at_depth, 100_000, |n| tail_sum(n), 5_000_050_000);
survives_depth!(modulo_at_depth, 100_000, |n| modulo_sum(n), 5_000_050_000);
survives_depth!(mutual_at_depth, 100_000, |n| (is_even(n), is_odd(n)), (true, false));
survives_depth!(
    deferred_at_depth,
    100_000,
    |n| {
        let chain = compose_all((0..n).map(|_| |x: u64| x + 1));
        run_deferred(chain.call(0))
    },
    100_000
);
survives_depth!(
    composition_at_depth,
    100_000,
    |n| {
        let inc = Stage::map(|x: u64| x + 1);
        let mut nested = inc.clone();
        for _ in 1..n {
            nested = compose(nested, inc.clone());
        }
        run_deferred(Bounce::call(&nested, 0))
    },
    100_000
);
survives_depth!(
    composition_dropped_unrun_at_depth,
    100_000,
    |n| {
        let inc = Stage::map(|x: u64| x + 1);
        let mut nested = inc.clone();
        for _ in 1..n {
            nested = compose(nested, inc.clone());
        }
        let len = nested.len();
        drop(nested);
        len
    },
    100_000
);
survives_depth!(
    mutual_closure_table_at_depth,
    100_001,
    |n| {
        #[derive(Debug)]
        enum Name {
            Ping,
            Pong,
        }
        let table = |name: &Name, (left, hits): (u64, u64)| match (name, left) {
            | (_, 0) => MutualStep::Done(hits),
            | (Name::Ping, left) => MutualStep::ContinueWith(Name::Pong, (left - 1, hits)),
            | (Name::Pong, left) => MutualStep::ContinueWith(Name::Ping, (left - 1, hits + 1)),
        };
        run_mutual(&table, Name::Ping, (n, 0))
            .unwrap_or_else(|never| match never {})
    },
    50_000
);

/* ---------------------------- Shape-specific ------------------------------- */

#[test]
fn right_fold_short_circuits() {
    // product from the right; a zero stops the unwind before the left part is visited
    let items: Vec<u64> = vec![7, 7, 7, 0, 2, 3];
    let visited = std::cell::Cell::new(0);
    let product = try_fold_right(&items, 1, |x, acc| {
        visited.set(visited.get() + 1);
        match x {
            | 0 => ControlFlow::Break(0),
            | x => ControlFlow::Continue(x * acc),
        }
    });
    assert_eq!(product, 0);
    assert_eq!(visited.get(), 3);
}

#[test]
fn composed_stage_defers_its_parts() {
    let inc: Stage<u64> = Stage::new(|x| Bounce::Done(x + 1));
    let dbl: Stage<u64> = Stage::map(|x| x * 2);
    let composed = compose(inc, dbl);
    // the stage alone produces a marker, not the value
    assert!(!matches!(composed.invoke(1), Bounce::Done(_)));
    assert_eq!(run_deferred(Bounce::call(&composed, 1)), 4);
    let longer = Chain::new().then(move |x| Bounce::call(&composed, x)).then_map(|x| x + 100);
    assert_eq!(run_deferred(longer.call(1)), 104);
}
