/// A value that is either already available or still behind a thunk `K`.
///
/// Producers return this to say "here is the answer" or "keep forcing that one".
#[derive(Clone, Debug)]
pub enum Deferred<T, K> {
    Now(T),
    Later(K),
}

impl<T, K> Deferred<T, K> {
    pub fn is_now(&self) -> bool {
        matches!(self, Deferred::Now(_))
    }
    pub fn map_now<U>(self, f: impl FnOnce(T) -> U) -> Deferred<U, K> {
        match self {
            | Deferred::Now(t) => Deferred::Now(f(t)),
            | Deferred::Later(k) => Deferred::Later(k),
        }
    }
}
