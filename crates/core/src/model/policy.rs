// Access policies - declarative guardrails over query patterns.
//
// A policy is a predicate over the requested segment sequence. It produces
// an allow/deny decision plus a row estimate derived from per-segment
// cardinality multipliers.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Multiplier assumed for an `ALL` segment past the end of the configured
/// multiplier list.
const DEFAULT_CARDINALITY_MULTIPLIER: u64 = 100;

const DEFAULT_BASE_ROW_COUNT: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessPolicy {
    /// Segment indices that must not be `ALL`.
    #[serde(default)]
    pub required_segments: Vec<usize>,
    /// Minimum number of non-`ALL` segments.
    #[serde(default)]
    pub min_filters: usize,
    /// Case-insensitive patterns matched against the slash-joined path.
    #[serde(default)]
    pub blocked_patterns: Vec<String>,
    #[serde(default)]
    pub max_rows_warn: Option<u64>,
    #[serde(default)]
    pub max_rows_block: Option<u64>,
    #[serde(default)]
    pub cardinality_multipliers: Vec<u64>,
    #[serde(default = "default_base_row_count")]
    pub base_row_count: u64,
    #[serde(default)]
    pub require_confirmation_above: Option<u64>,
    /// Overrides the default denial text; surfaced verbatim.
    #[serde(default)]
    pub denial_message: Option<String>,
    #[serde(default)]
    pub allowed_roles: Vec<String>,
    /// `[start, end]` in UTC.
    #[serde(default)]
    pub allowed_hours: Option<[u32; 2]>,
}

fn default_base_row_count() -> u64 {
    DEFAULT_BASE_ROW_COUNT
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            required_segments: Vec::new(),
            min_filters: 0,
            blocked_patterns: Vec::new(),
            max_rows_warn: None,
            max_rows_block: None,
            cardinality_multipliers: Vec::new(),
            base_row_count: DEFAULT_BASE_ROW_COUNT,
            require_confirmation_above: None,
            denial_message: None,
            allowed_roles: Vec::new(),
            allowed_hours: None,
        }
    }
}

/// Outcome of validating a segment sequence against a policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
    /// Denial reason, or a non-fatal warning on an allowed decision.
    pub message: Option<String>,
    pub estimated_rows: u64,
}

impl AccessPolicy {
    /// Estimated result size: base row count times the multiplier of every
    /// `ALL` segment (case-insensitive).
    pub fn estimate_rows(&self, segments: &[String]) -> u64 {
        let base = if self.base_row_count == 0 {
            DEFAULT_BASE_ROW_COUNT
        } else {
            self.base_row_count
        };
        segments
            .iter()
            .enumerate()
            .filter(|(_, segment)| segment.eq_ignore_ascii_case("all"))
            .fold(base, |estimate, (index, _)| {
                let multiplier = self
                    .cardinality_multipliers
                    .get(index)
                    .copied()
                    .unwrap_or(DEFAULT_CARDINALITY_MULTIPLIER);
                estimate.saturating_mul(multiplier)
            })
    }

    /// Validate a query pattern. A query is allowed iff no blocked pattern
    /// matches, all required segments are specific, the filter minimum is
    /// met, and the estimate stays within `max_rows_block`.
    pub fn validate(&self, segments: &[String]) -> PolicyDecision {
        let path = segments.join("/");
        let estimated_rows = self.estimate_rows(segments);

        for pattern in &self.blocked_patterns {
            if pattern_matches(pattern, &path) {
                return self.deny_with_override(
                    format!("query pattern '{path}' is blocked by access policy"),
                    estimated_rows,
                );
            }
        }

        for &index in &self.required_segments {
            if segments
                .get(index)
                .is_some_and(|segment| segment.eq_ignore_ascii_case("all"))
            {
                return deny(
                    format!("segment {index} must be specified and cannot be ALL"),
                    estimated_rows,
                );
            }
        }

        if self.min_filters > 0 {
            let specific = segments
                .iter()
                .filter(|segment| !segment.eq_ignore_ascii_case("all"))
                .count();
            if specific < self.min_filters {
                return deny(
                    format!(
                        "at least {} specific filters are required, but only {specific} provided",
                        self.min_filters
                    ),
                    estimated_rows,
                );
            }
        }

        if let Some(block) = self.max_rows_block {
            if estimated_rows > block {
                return self.deny_with_override(
                    format!(
                        "query would return ~{estimated_rows} rows, exceeding the limit of \
                         {block}; add more specific filters to reduce the result size"
                    ),
                    estimated_rows,
                );
            }
        }

        let message = self.max_rows_warn.and_then(|warn| {
            (estimated_rows > warn)
                .then(|| format!("large query: estimated {estimated_rows} rows"))
        });

        PolicyDecision {
            allowed: true,
            message,
            estimated_rows,
        }
    }

    /// Denial for the pattern and row-limit checks, where the configured
    /// `denial_message` supersedes the default wording. The structural
    /// checks (required segments, min_filters) always keep their own
    /// message. estimated_rows stays available as a structured field.
    fn deny_with_override(&self, default_message: String, estimated_rows: u64) -> PolicyDecision {
        deny(
            self.denial_message.clone().unwrap_or(default_message),
            estimated_rows,
        )
    }
}

fn deny(message: String, estimated_rows: u64) -> PolicyDecision {
    PolicyDecision {
        allowed: false,
        message: Some(message),
        estimated_rows,
    }
}

/// Blocked patterns are regexes; ones that fail to compile fall back to a
/// case-insensitive substring match so a bad pattern still blocks what it
/// names.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    match Regex::new(&format!("(?i){pattern}")) {
        Ok(re) => re.is_match(path),
        Err(_) => path.to_lowercase().contains(&pattern.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn estimate_multiplies_only_all_segments() {
        let policy = AccessPolicy {
            base_row_count: 1000,
            cardinality_multipliers: vec![10, 10, 10],
            ..AccessPolicy::default()
        };
        assert_eq!(policy.estimate_rows(&segments(&["ALL", "ALL", "x"])), 100_000);
        assert_eq!(policy.estimate_rows(&segments(&["a", "b", "c"])), 1000);
    }

    #[test]
    fn estimate_defaults_past_multiplier_list() {
        let policy = AccessPolicy {
            base_row_count: 10,
            cardinality_multipliers: vec![2],
            ..AccessPolicy::default()
        };
        // Second ALL has no configured multiplier, so 100 applies.
        assert_eq!(policy.estimate_rows(&segments(&["all", "ALL"])), 2000);
    }

    #[test]
    fn row_limit_blocks() {
        let policy = AccessPolicy {
            base_row_count: 1000,
            cardinality_multipliers: vec![10, 10, 10],
            max_rows_block: Some(5000),
            ..AccessPolicy::default()
        };
        let decision = policy.validate(&segments(&["ALL", "ALL", "x"]));
        assert!(!decision.allowed);
        assert_eq!(decision.estimated_rows, 100_000);
        assert!(decision.message.unwrap().contains("5000"));
    }

    #[test]
    fn blocked_pattern_matches_case_insensitively() {
        let policy = AccessPolicy {
            blocked_patterns: vec!["secret".to_string()],
            ..AccessPolicy::default()
        };
        let decision = policy.validate(&segments(&["a", "SECRET", "c"]));
        assert!(!decision.allowed);
    }

    #[test]
    fn invalid_regex_falls_back_to_substring() {
        let policy = AccessPolicy {
            blocked_patterns: vec!["se(cret".to_string()],
            ..AccessPolicy::default()
        };
        assert!(!policy.validate(&segments(&["a", "se(cret"])).allowed);
        assert!(policy.validate(&segments(&["a", "open"])).allowed);
    }

    #[test]
    fn required_segment_rejects_all() {
        let policy = AccessPolicy {
            required_segments: vec![1],
            ..AccessPolicy::default()
        };
        assert!(!policy.validate(&segments(&["a", "all"])).allowed);
        assert!(policy.validate(&segments(&["all", "b"])).allowed);
        // Index past the end is not a violation.
        assert!(policy.validate(&segments(&["a"])).allowed);
    }

    #[test]
    fn min_filters_counts_specific_segments() {
        let policy = AccessPolicy {
            min_filters: 2,
            ..AccessPolicy::default()
        };
        assert!(!policy.validate(&segments(&["a", "ALL"])).allowed);
        assert!(policy.validate(&segments(&["a", "b", "ALL"])).allowed);
    }

    #[test]
    fn warning_is_non_fatal() {
        let policy = AccessPolicy {
            base_row_count: 500,
            max_rows_warn: Some(100),
            ..AccessPolicy::default()
        };
        let decision = policy.validate(&segments(&["a"]));
        assert!(decision.allowed);
        assert!(decision.message.unwrap().contains("large query"));
    }

    #[test]
    fn denial_message_override_is_verbatim_for_row_limits() {
        let policy = AccessPolicy {
            max_rows_block: Some(1),
            base_row_count: 10,
            denial_message: Some("contact #data-access before querying this set".to_string()),
            ..AccessPolicy::default()
        };
        let decision = policy.validate(&segments(&["a"]));
        assert!(!decision.allowed);
        assert_eq!(
            decision.message.as_deref(),
            Some("contact #data-access before querying this set")
        );
        assert_eq!(decision.estimated_rows, 10);
    }

    #[test]
    fn denial_message_override_applies_to_blocked_patterns() {
        let policy = AccessPolicy {
            blocked_patterns: vec!["secret".to_string()],
            denial_message: Some("this set is restricted".to_string()),
            ..AccessPolicy::default()
        };
        let decision = policy.validate(&segments(&["a", "secret"]));
        assert!(!decision.allowed);
        assert_eq!(decision.message.as_deref(), Some("this set is restricted"));
    }

    #[test]
    fn structural_denials_keep_their_own_message() {
        // Required-segment and min-filter denials always explain which
        // constraint failed, even when an override is configured.
        let policy = AccessPolicy {
            required_segments: vec![1],
            denial_message: Some("this set is restricted".to_string()),
            ..AccessPolicy::default()
        };
        let decision = policy.validate(&segments(&["a", "ALL"]));
        assert!(!decision.allowed);
        assert!(decision.message.unwrap().contains("segment 1"));

        let policy = AccessPolicy {
            min_filters: 2,
            denial_message: Some("this set is restricted".to_string()),
            ..AccessPolicy::default()
        };
        let decision = policy.validate(&segments(&["a", "ALL"]));
        assert!(!decision.allowed);
        assert!(decision
            .message
            .unwrap()
            .contains("at least 2 specific filters"));
    }

    #[test]
    fn decision_is_deterministic() {
        let policy = AccessPolicy {
            base_row_count: 1000,
            cardinality_multipliers: vec![10, 10],
            max_rows_block: Some(5000),
            ..AccessPolicy::default()
        };
        let input = segments(&["ALL", "x"]);
        assert_eq!(policy.validate(&input), policy.validate(&input));
    }
}
