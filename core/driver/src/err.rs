use lazytramp_tramp::TrampError;
use std::{convert::Infallible, io, path::PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Tramp(#[from] TrampError),
    #[error("Configuration file not found: `{}`", .0.display())]
    ConfNotFound(PathBuf),
    #[error("Configuration file at `{}` invalid: {}", .0.display(), .1)]
    ConfInvalid(PathBuf, io::Error),
}

impl From<Infallible> for RunError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

pub type Result<T> = std::result::Result<T, RunError>;
