//! Per-run budgets parsed from the positional settings string.
//!
//! The settings string is colon-delimited and positional:
//!
//! ```text
//! maxApiCalls:maxRecommendations:smallResultCeiling:largeResultFloor:maxShownPerSession
//! ```
//!
//! An empty entry (or a missing trailing entry) means the limit is unbounded.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OntorecError, Result};

/// An upper (or lower) bound that may be switched off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Limit {
    #[default]
    Unbounded,
    AtMost(u32),
}

impl Limit {
    /// Parses a single settings entry. Empty means unbounded, `"0"` means zero.
    pub fn parse_entry(entry: &str) -> Result<Self> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Ok(Self::Unbounded);
        }
        entry
            .parse::<u32>()
            .map(Self::AtMost)
            .map_err(|e| OntorecError::config(format!("Invalid limit '{}': {}", entry, e)))
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// True when `value` stays within the limit.
    pub fn admits(&self, value: u64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::AtMost(max) => value <= u64::from(*max),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => Ok(()),
            Self::AtMost(value) => write!(f, "{}", value),
        }
    }
}

/// Read-only budget for one recommendation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Budget {
    /// Thesaurus calls per run, `search` and `narrower` alike
    pub max_api_calls: Limit,
    /// Distinct term buckets per run
    pub max_recommendations: Limit,
    /// Result totals at or below this are "small"
    pub small_result_ceiling: Limit,
    /// Result totals at or above this are "large" and allow hyponym expansion
    pub large_result_floor: Limit,
    /// Batches shown per browser session
    pub max_shown_per_session: Limit,
}

impl Budget {
    /// A budget with every limit switched off.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Parses the colon-delimited positional settings string.
    ///
    /// Entries beyond the fifth are ignored.
    pub fn parse(settings: &str) -> Result<Self> {
        let mut entries = settings.split(':');
        let mut next = || Limit::parse_entry(entries.next().unwrap_or(""));

        Ok(Self {
            max_api_calls: next()?,
            max_recommendations: next()?,
            small_result_ceiling: next()?,
            large_result_floor: next()?,
            max_shown_per_session: next()?,
        })
    }

    /// Can `needed` more calls be made once `made` calls have been issued.
    pub fn can_call(&self, made: u32, needed: u32) -> bool {
        self.max_api_calls
            .admits(u64::from(made) + u64::from(needed))
    }

    /// Can another term bucket be opened once `buckets` exist.
    pub fn can_add_recommendation(&self, buckets: u32) -> bool {
        match self.max_recommendations {
            Limit::Unbounded => true,
            Limit::AtMost(max) => buckets < max,
        }
    }

    /// Unbounded floor counts every result set as large; unknown totals never are.
    pub fn is_large_result(&self, total: Option<u64>) -> bool {
        match (self.large_result_floor, total) {
            (Limit::Unbounded, _) => true,
            (Limit::AtMost(floor), Some(total)) => total >= u64::from(floor),
            (Limit::AtMost(_), None) => false,
        }
    }

    /// Unbounded ceiling counts every result set as small; unknown totals never are.
    pub fn is_small_result(&self, total: Option<u64>) -> bool {
        match (self.small_result_ceiling, total) {
            (Limit::Unbounded, _) => true,
            (Limit::AtMost(ceiling), Some(total)) => total <= u64::from(ceiling),
            (Limit::AtMost(_), None) => false,
        }
    }

    /// True once `shown` batches meet the per-session display cap.
    pub fn display_cap_reached(&self, shown: u32) -> bool {
        match self.max_shown_per_session {
            Limit::Unbounded => false,
            Limit::AtMost(max) => shown >= max,
        }
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.max_api_calls,
            self.max_recommendations,
            self.small_result_ceiling,
            self.large_result_floor,
            self.max_shown_per_session
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let budget = Budget::parse("2:3:50:1000:5").unwrap();
        assert_eq!(budget.max_api_calls, Limit::AtMost(2));
        assert_eq!(budget.max_recommendations, Limit::AtMost(3));
        assert_eq!(budget.small_result_ceiling, Limit::AtMost(50));
        assert_eq!(budget.large_result_floor, Limit::AtMost(1000));
        assert_eq!(budget.max_shown_per_session, Limit::AtMost(5));
    }

    #[test]
    fn test_empty_entries_are_unbounded() {
        let budget = Budget::parse("2:::1000").unwrap();
        assert_eq!(budget.max_api_calls, Limit::AtMost(2));
        assert!(budget.max_recommendations.is_unbounded());
        assert!(budget.small_result_ceiling.is_unbounded());
        assert_eq!(budget.large_result_floor, Limit::AtMost(1000));
        assert!(budget.max_shown_per_session.is_unbounded());

        assert_eq!(Budget::parse("").unwrap(), Budget::unbounded());
    }

    #[test]
    fn test_zero_is_not_unbounded() {
        let budget = Budget::parse("0").unwrap();
        assert_eq!(budget.max_api_calls, Limit::AtMost(0));
        assert!(!budget.can_call(0, 1));
    }

    #[test]
    fn test_garbage_entry_is_config_error() {
        let err = Budget::parse("two:3").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_can_call_look_ahead() {
        let budget = Budget::parse("3").unwrap();
        assert!(budget.can_call(1, 2));
        assert!(!budget.can_call(2, 2));
        assert!(budget.can_call(2, 1));
        assert!(Budget::unbounded().can_call(u32::MAX, 2));
    }

    #[test]
    fn test_result_size_checks() {
        let budget = Budget::parse("::10:100").unwrap();
        assert!(budget.is_large_result(Some(100)));
        assert!(!budget.is_large_result(Some(99)));
        assert!(!budget.is_large_result(None));
        assert!(budget.is_small_result(Some(10)));
        assert!(!budget.is_small_result(Some(11)));
        assert!(Budget::unbounded().is_large_result(None));
    }

    #[test]
    fn test_display_cap() {
        let budget = Budget::parse("::::2").unwrap();
        assert!(!budget.display_cap_reached(1));
        assert!(budget.display_cap_reached(2));
        assert!(!Budget::unbounded().display_cap_reached(u32::MAX));
    }

    #[test]
    fn test_display_matches_settings_string() {
        let budget = Budget::parse("2:::1000:5").unwrap();
        assert_eq!(budget.to_string(), "2:::1000:5");
    }
}
