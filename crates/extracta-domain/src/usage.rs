//! Token accounting

use serde::{Deserialize, Serialize};

/// Token counts reported by a provider
///
/// A field set to [`Usage::UNREPORTED`] means the provider did not report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Tokens in the request
    pub prompt_tokens: i64,
    /// Tokens in the response
    pub completion_tokens: i64,
    /// Total tokens billed
    pub total_tokens: i64,
}

impl Usage {
    /// Sentinel for a count the provider did not report
    pub const UNREPORTED: i64 = -1;

    /// Usage with every field reported
    pub fn new(prompt_tokens: i64, completion_tokens: i64, total_tokens: i64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }

    /// Usage with every field unreported
    pub fn unreported() -> Self {
        Self::new(Self::UNREPORTED, Self::UNREPORTED, Self::UNREPORTED)
    }

    /// Build from optional provider counters, substituting the sentinel
    ///
    /// Absent and negative counters both become [`Usage::UNREPORTED`].
    pub fn from_reported(prompt: Option<i64>, completion: Option<i64>, total: Option<i64>) -> Self {
        let count = |n: Option<i64>| n.filter(|n| *n >= 0).unwrap_or(Self::UNREPORTED);
        Self::new(count(prompt), count(completion), count(total))
    }
}

impl Default for Usage {
    fn default() -> Self {
        Self::unreported()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_counters_become_sentinel() {
        let usage = Usage::from_reported(Some(12), None, Some(30));
        assert_eq!(usage, Usage::new(12, -1, 30));
    }

    #[test]
    fn test_negative_counters_become_sentinel() {
        let usage = Usage::from_reported(Some(-1), Some(4), Some(-7));
        assert_eq!(usage, Usage::new(-1, 4, -1));
    }

    #[test]
    fn test_camel_case_wire_names() {
        let value = serde_json::to_value(Usage::new(1, 2, 3)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "promptTokens": 1, "completionTokens": 2, "totalTokens": 3 })
        );
    }
}
