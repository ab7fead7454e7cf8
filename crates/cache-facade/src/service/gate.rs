//! Gate policy: which facade operations are refused while disabled.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Facade operation, as seen by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Put,
    Expire,
    Get,
    GetMany,
    ContainsKey,
    Remove,
    Clear,
    Keys,
    Count,
}

impl Operation {
    /// Mutating operations fail while gated; reads resolve to an empty value.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Put | Self::Expire | Self::Remove | Self::Clear)
    }
}

/// Gate policy enum - determines which operations check the enabled flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatePolicy {
    /// Every operation is gated
    #[default]
    Uniform,
    /// Only `put`, `get` and `get_many` are gated; everything else always
    /// reaches the store
    Legacy,
}

impl GatePolicy {
    /// Whether `op` is refused while the facade is disabled
    #[must_use]
    pub const fn gates(self, op: Operation) -> bool {
        match self {
            Self::Uniform => true,
            Self::Legacy => matches!(op, Operation::Put | Operation::Get | Operation::GetMany),
        }
    }
}

impl fmt::Display for GatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uniform => "uniform",
            Self::Legacy => "legacy",
        })
    }
}

impl FromStr for GatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uniform" => Ok(Self::Uniform),
            "legacy" => Ok(Self::Legacy),
            other => Err(format!("unknown gate policy '{other}' (expected uniform or legacy)")),
        }
    }
}
