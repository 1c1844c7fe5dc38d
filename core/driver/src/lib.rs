#![allow(clippy::style)]

//! Trampoline drivers bound to a configuration: a step budget, run statistics and
//! logging set up once for the whole process.

pub mod conf;
pub mod err;


pub use conf::Conf;
pub use err::*;
pub use lazytramp_thunk as thunk;
pub use lazytramp_tramp as tramp;

use lazytramp_tramp::{
    Bounce, Budget, Eval, Meter, ModuloStep, Stats, Step, StepTable, drive_deferred, drive_modulo,
    drive_mutual, drive_tail,
};
use sculptor::{FileIO, ProjectInfo};
use std::{cell::Cell, io, path::PathBuf};

/// Install `env_logger` as the `log` backend, honouring `RUST_LOG`. Later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env().format_timestamp(None).try_init();
}

/// Runs trampolines under one configuration and keeps the statistics of every run.
pub struct Driver {
    pub conf: Conf,
    total: Cell<Stats>,
    runs: Cell<u64>,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver {
    /// Read the configuration from the user's config directory, falling back to the
    /// defaults when there is none.
    pub fn new() -> Self {
        let path = Conf::config_dir().join("lazytramp.toml");
        let file_conf = FileIO::new(path.clone());
        let conf = file_conf.load().unwrap_or_else(|_| {
            log::warn!("Using default configuration; suppose to find one at `{}`.", path.display());
            let conf: Conf = Default::default();
            if let Err(e) = file_conf.save(&conf) {
                log::debug!("could not write default configuration: {}", e);
            }
            conf
        });
        Self::with_conf(conf)
    }
    pub fn with_conf(conf: Conf) -> Self {
        Driver { conf, total: Cell::new(Stats::default()), runs: Cell::new(0) }
    }
    /// Read the configuration from `path`; a missing or malformed file is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conf = FileIO::new(path.clone()).load().map_err(|e: io::Error| match e.kind() {
            | io::ErrorKind::NotFound => RunError::ConfNotFound(path.clone()),
            | _ => RunError::ConfInvalid(path.clone(), e),
        })?;
        Ok(Self::with_conf(conf))
    }

    /// Statistics summed over every run so far, including the ones that hit the budget.
    pub fn stats(&self) -> Stats {
        self.total.get()
    }
    pub fn runs(&self) -> u64 {
        self.runs.get()
    }

    fn budget(&self) -> Budget {
        Budget::new(self.conf.step_limit)
    }
    fn record<T>(&self, kind: &str, budget: Budget, res: Result<T>) -> Result<T> {
        let stats = budget.stats();
        let mut total = self.total.get();
        total += stats;
        self.total.set(total);
        self.runs.set(self.runs.get() + 1);
        if self.conf.log_stats {
            log::debug!("{} run: {} step(s), {} parked", kind, stats.steps, stats.parked);
        }
        if let Err(e) = &res {
            log::warn!("{} run stopped: {}", kind, e);
        }
        res
    }
}

/* ---------------------------------- Runs ---------------------------------- */

impl Driver {
    pub fn tail<S, R>(&self, step: impl FnMut(S) -> Step<S, R>, init: S) -> Result<R> {
        let mut budget = self.budget();
        let res = drive_tail(step, init, &mut budget).map_err(RunError::from);
        self.record("tail", budget, res)
    }
    pub fn eval<E: Eval>(&self, init: E) -> Result<E::Out> {
        self.tail(E::step, init)
    }
    pub fn modulo<'a, S, R>(
        &self, step: impl FnMut(S) -> ModuloStep<'a, S, R>, init: S,
    ) -> Result<R> {
        let mut budget = self.budget();
        let res = drive_modulo(step, init, &mut budget).map_err(RunError::from);
        self.record("modulo", budget, res)
    }
    pub fn mutual<K, S, R, T>(&self, table: &T, name: K, state: S) -> Result<R>
    where
        K: std::fmt::Debug,
        T: StepTable<K, S, R>,
        RunError: From<T::Error>,
    {
        let mut budget = self.budget();
        let res = drive_mutual(table, name, state, &mut budget);
        self.record("mutual", budget, res)
    }
    pub fn deferred<A: Clone>(&self, start: Bounce<A>) -> Result<A> {
        let mut budget = self.budget();
        let res = drive_deferred(start, &mut budget).map_err(RunError::from);
        self.record("deferred", budget, res)
    }
}
