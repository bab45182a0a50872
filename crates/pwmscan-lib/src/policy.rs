//! Unrecognized-symbol policies
//!
//! The recoder and the window scorer each run one algorithm parameterized
//! by a zero-sized policy type. The policy flag is an associated constant,
//! so the strict instantiation compiles without the sentinel branch.

use std::fmt;

/// How an encoded stream's sentinel symbols are treated
pub trait ScoringPolicy: Send + Sync + 'static {
    /// Whether the stream may contain [`crate::constants::UNRECOGNIZED`]
    const SENTINEL_AWARE: bool;
}

/// Assumes every symbol is in the alphabet
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

/// Propagates sentinels through recoding and penalizes them when scoring
#[derive(Debug, Clone, Copy, Default)]
pub struct SentinelAware;

impl ScoringPolicy for Strict {
    const SENTINEL_AWARE: bool = false;
}

impl ScoringPolicy for SentinelAware {
    const SENTINEL_AWARE: bool = true;
}

/// Runtime choice of policy, made once per scan from the encoding phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// No unrecognized symbols were seen
    Strict,
    /// At least one sequence contained an unrecognized symbol
    SentinelAware,
}

impl ScoringMode {
    /// Select the mode from the global "any sentinel seen" flag
    pub fn from_unrecognized(any_unrecognized: bool) -> Self {
        if any_unrecognized {
            ScoringMode::SentinelAware
        } else {
            ScoringMode::Strict
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Strict => write!(f, "strict"),
            ScoringMode::SentinelAware => write!(f, "sentinel-aware"),
        }
    }
}

/// Expand `$body` once per policy, binding the policy type to `$policy`
///
/// ```
/// use pwmscan_lib::dispatch_on_mode;
/// use pwmscan_lib::policy::{ScoringMode, ScoringPolicy};
///
/// fn aware<P: ScoringPolicy>() -> bool { P::SENTINEL_AWARE }
///
/// let mode = ScoringMode::from_unrecognized(true);
/// assert!(dispatch_on_mode!(mode, P => { aware::<P>() }));
/// ```
#[macro_export]
macro_rules! dispatch_on_mode {
    ($mode:expr, $policy:ident => $body:block) => {
        match $mode {
            $crate::policy::ScoringMode::Strict => {
                type $policy = $crate::policy::Strict;
                $body
            }
            $crate::policy::ScoringMode::SentinelAware => {
                type $policy = $crate::policy::SentinelAware;
                $body
            }
        }
    };
}
