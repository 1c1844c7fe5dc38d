use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
};

/// Run a producer, turning a panic into its message.
pub(crate) fn guard<R>(producer: impl FnOnce() -> R) -> Result<R, String> {
    catch_unwind(AssertUnwindSafe(producer)).map_err(|payload| message(payload.as_ref()))
}

fn message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
