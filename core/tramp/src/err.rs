use std::convert::Infallible;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrampError {
    #[error("no step function is registered under `{name}`")]
    UnknownStep { name: String },
    #[error("step budget of {limit} exhausted")]
    StepLimit { limit: u64 },
    #[error("entry thunk failed to force: {0}")]
    Force(String),
}

impl From<Infallible> for TrampError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

pub type Result<T> = std::result::Result<T, TrampError>;
