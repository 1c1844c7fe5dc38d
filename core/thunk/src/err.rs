use thiserror::Error;

/// Why forcing a thunk did not produce a value.
///
/// The outcome is recorded in the thunk, so every later force reports the same error
/// without running the producer again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ForceError<E> {
    #[error("producer failed: {0}")]
    Failed(E),
    #[error("producer panicked: {0}")]
    Panicked(String),
    #[error("thunk was forced from inside its own producer")]
    Cycle,
}

impl<E> From<E> for ForceError<E> {
    fn from(err: E) -> Self {
        ForceError::Failed(err)
    }
}

pub type Outcome<T, E> = std::result::Result<T, ForceError<E>>;
