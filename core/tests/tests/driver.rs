use lazytramp_driver::{Conf, Driver, RunError, init_logging, tramp::*};
use lazytramp_tramp::recipes::Parity;
use pretty_assertions::assert_eq;

fn parity(name: &Parity, n: u64) -> MutualStep<Parity, u64, bool> {
    match (name, n) {
        | (Parity::Even, 0) => MutualStep::Done(true),
        | (Parity::Odd, 0) => MutualStep::Done(false),
        | (Parity::Even, n) => MutualStep::ContinueWith(Parity::Odd, n - 1),
        | (Parity::Odd, n) => MutualStep::ContinueWith(Parity::Even, n - 1),
    }
}

#[test]
fn budget_turns_runaway_loops_into_errors() {
    init_logging();
    let driver = Driver::with_conf(Conf { step_limit: Some(10_000), log_stats: true });
    // a step function that forgot its base case
    let res = driver.tail(|n: u64| Step::<u64, u64>::Continue(n.wrapping_add(1)), 0);
    assert!(matches!(res, Err(RunError::Tramp(TrampError::StepLimit { limit: 10_000 }))));
    assert_eq!(res.unwrap_err().to_string(), "step budget of 10000 exhausted");
}

#[test]
fn driver_totals_span_runs() {
    let driver = Driver::with_conf(Conf::default());
    assert_eq!(driver.mutual(&parity, Parity::Even, 99).unwrap(), false);
    let sum = Chain::new().fold(|acc, x| Bounce::Done(acc + x), 1..=10u64);
    let folded = driver.deferred(sum.call(0));
    assert_eq!(folded.unwrap(), 55);
    assert_eq!(driver.runs(), 2);
    assert_eq!(driver.stats(), Stats { steps: 100 + 10, parked: 10 });
}
