use sculptor::{AppAuthor, impl_serde_str_toml};
use serde::{Deserialize, Serialize};

/// Driver configuration, read from `lazytramp.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Conf {
    /// Steps a single run may take before it is stopped; unbounded when absent.
    #[serde(default)]
    pub step_limit: Option<u64>,
    /// Log the statistics of every finished run at `debug` level.
    #[serde(default)]
    pub log_stats: bool,
}

impl_serde_str_toml!(Conf);

impl AppAuthor for Conf {
    fn app_name() -> &'static str {
        "lazytramp"
    }

    fn author() -> &'static str {
        "The Lazytramp Developers"
    }
}
