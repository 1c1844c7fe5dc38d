//! Step accounting for the drivers.

use crate::err::TrampError;
use derive_more::{Add, AddAssign};
use std::convert::Infallible;

/// What one driver run did.
#[derive(Add, AddAssign, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Transitions performed, counting every invocation of a step function or stage.
    pub steps: u64,
    /// Work items parked for later: pending ops of the modulo driver, chain nodes of the
    /// deferred driver.
    pub parked: u64,
}

/// Observes every transition of a driver and may stop it.
pub trait Meter {
    type Error;
    fn tick(&mut self) -> Result<(), Self::Error>;
    fn park(&mut self, items: usize);
    fn stats(&self) -> Stats;
}

/// Counts, never stops.
#[derive(Clone, Debug, Default)]
pub struct Unmetered(Stats);

impl Meter for Unmetered {
    type Error = Infallible;
    fn tick(&mut self) -> Result<(), Infallible> {
        self.0.steps += 1;
        Ok(())
    }
    fn park(&mut self, items: usize) {
        self.0.parked += items as u64;
    }
    fn stats(&self) -> Stats {
        self.0
    }
}

/// Counts and stops the run once `limit` transitions were made.
#[derive(Clone, Debug, Default)]
pub struct Budget {
    limit: Option<u64>,
    stats: Stats,
}

impl Budget {
    pub fn new(limit: Option<u64>) -> Self {
        Budget { limit, stats: Stats::default() }
    }
    pub fn limited(limit: u64) -> Self {
        Self::new(Some(limit))
    }
}

impl Meter for Budget {
    type Error = TrampError;
    fn tick(&mut self) -> Result<(), TrampError> {
        match self.limit {
            | Some(limit) if self.stats.steps >= limit => Err(TrampError::StepLimit { limit }),
            | _ => {
                self.stats.steps += 1;
                Ok(())
            }
        }
    }
    fn park(&mut self, items: usize) {
        self.stats.parked += items as u64;
    }
    fn stats(&self) -> Stats {
        self.stats
    }
}

/// Unwrap the result of a run that cannot fail.
pub(crate) fn infallible<T>(res: Result<T, Infallible>) -> T {
    match res {
        | Ok(t) => t,
        | Err(never) => match never {},
    }
}
