use crate::{
    meter::{Meter, Unmetered, infallible},
    step::Step,
};

/// Run a tail-recursive step function to completion.
///
/// The native stack stays flat however many steps are taken. A step function that never
/// answers `Done` loops forever.
pub fn run_tail<S, R>(step: impl FnMut(S) -> Step<S, R>, init: S) -> R {
    infallible(drive_tail(step, init, &mut Unmetered::default()))
}

pub fn drive_tail<S, R, M: Meter>(
    mut step: impl FnMut(S) -> Step<S, R>, init: S, meter: &mut M,
) -> Result<R, M::Error> {
    let mut state = init;
    loop {
        meter.tick()?;
        match step(state) {
            | Step::Continue(next) => state = next,
            | Step::Done(out) => break Ok(out),
        }
    }
}
