//! Logging setup and the verbosity level threaded through a run.

mod tracing_init;

pub use tracing_init::*;

/// How much diagnostic output the user asked for with `--verbose [level]`.
///
/// Passed explicitly to tracing initialization and to the query pipeline
/// rather than kept as process-wide state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Only warnings and errors (or whatever the config file asks for).
    #[default]
    Quiet,
    /// Pipeline stage summaries.
    Debug,
    /// Per-model decisions: index samples, superseded versions.
    Trace,
}

impl Verbosity {
    /// Map a `--verbose` level; anything above 2 is treated as 2.
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Quiet,
            1 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// Level applied to this crate's targets, if verbosity overrides config.
    pub fn crate_level(self) -> Option<&'static str> {
        match self {
            Self::Quiet => None,
            Self::Debug => Some("debug"),
            Self::Trace => Some("trace"),
        }
    }

    /// Whether stages should explain individual decisions.
    pub fn explains(self) -> bool {
        self >= Self::Trace
    }
}
