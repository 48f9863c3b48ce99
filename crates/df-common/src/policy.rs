//! Not-found policy for out-of-vocabulary labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule applied to labels that fall outside an accepted vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundPolicy {
    /// Drop offending rows.
    Ignore,
    /// Fail on the first offending label.
    Exception,
    /// Substitute a configured default label.
    Default,
}

impl fmt::Display for NotFoundPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundPolicy::Ignore => write!(f, "ignore"),
            NotFoundPolicy::Exception => write!(f, "exception"),
            NotFoundPolicy::Default => write!(f, "default"),
        }
    }
}

impl FromStr for NotFoundPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(NotFoundPolicy::Ignore),
            "exception" => Ok(NotFoundPolicy::Exception),
            "default" => Ok(NotFoundPolicy::Default),
            other => Err(format!(
                "unknown not-found policy '{other}' (expected ignore, exception or default)"
            )),
        }
    }
}
