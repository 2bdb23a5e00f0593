//! Plugin execution contract.
//!
//! A plugin serves one or more item keys. The caller (scheduler, CLI test
//! mode) picks a key, passes positional string parameters and an optional
//! [`ExecContext`], and gets back a typed [`ItemValue`] or an
//! [`AgentError`].

pub mod key;
pub mod registry;

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::AgentError;

pub use key::ItemKey;
pub use registry::Registry;

/// Value produced by a successful item evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemValue {
    Uint(u64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ItemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemValue::Uint(v) => write!(f, "{}", v),
            ItemValue::Float(v) => write!(f, "{:.6}", v),
            ItemValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ItemValue {
    fn from(b: bool) -> Self {
        ItemValue::Uint(u64::from(b))
    }
}

/// Call-scoped metadata handed to a plugin.
///
/// The timeout is advisory here: enforcing it is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecContext {
    pub timeout: Duration,
}

impl ExecContext {
    pub const DEFAULT_TIMEOUT_SECS: u64 = 3;
    pub const MIN_TIMEOUT_SECS: u64 = 1;
    pub const MAX_TIMEOUT_SECS: u64 = 30;

    /// Creates a context with a timeout in seconds (1..=30).
    pub fn new(timeout_secs: u64) -> Result<Self, AgentError> {
        if !(Self::MIN_TIMEOUT_SECS..=Self::MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(AgentError::invalid_argument(format!(
                "timeout must be between {} and {} seconds, got {}",
                Self::MIN_TIMEOUT_SECS,
                Self::MAX_TIMEOUT_SECS,
                timeout_secs
            )));
        }
        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl Default for ExecContext {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Registration metadata for one item key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    pub key: &'static str,
    pub description: &'static str,
    /// Parameters used when the agent evaluates every item in print mode.
    pub sample_params: &'static [&'static str],
}

/// A metric-item plugin.
pub trait Plugin: Send + Sync {
    /// Plugin name, used for logging and duplicate-key reports.
    fn name(&self) -> &str;

    /// Item keys served by this plugin.
    fn metrics(&self) -> &[Metric];

    /// Evaluates `key` with positional `params`.
    ///
    /// # Errors
    /// * `UnsupportedKey` if `key` is not one of [`Plugin::metrics`]
    /// * `InvalidArgument` for bad parameters
    /// * `Io` when the underlying OS query fails
    fn export(
        &self,
        key: &str,
        params: &[String],
        ctx: Option<&ExecContext>,
    ) -> Result<ItemValue, AgentError>;
}

/// Extracts the only parameter of a single-argument item.
pub fn single_param(params: &[String]) -> Result<&str, AgentError> {
    match params {
        [] => Err(AgentError::invalid_argument("missing first parameter")),
        [first] if first.is_empty() => {
            Err(AgentError::invalid_argument("invalid first parameter"))
        }
        [first] => Ok(first.as_str()),
        _ => Err(AgentError::invalid_argument("too many parameters")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_single_param() {
        assert_eq!(single_param(&strings(&["/etc/hosts"])).unwrap(), "/etc/hosts");

        for bad in [strings(&[]), strings(&[""]), strings(&["a", "b"])] {
            let err = single_param(&bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_exec_context_timeout_range() {
        assert_eq!(ExecContext::default().timeout, Duration::from_secs(3));
        assert_eq!(ExecContext::new(30).unwrap().timeout, Duration::from_secs(30));
        assert!(ExecContext::new(0).is_err());
        assert!(ExecContext::new(31).is_err());
    }

    #[test]
    fn test_item_value_display() {
        assert_eq!(ItemValue::from(true).to_string(), "1");
        assert_eq!(ItemValue::from(false).to_string(), "0");
        assert_eq!(ItemValue::Float(0.5).to_string(), "0.500000");
        assert_eq!(ItemValue::Text("node-1".into()).to_string(), "node-1");
    }
}
