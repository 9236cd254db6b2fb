// Moniker parser.
//
// Format: [namespace@]path/segments[@version][/sub.resource][/vN][?query=params]
//
// Examples:
//   - indices.sovereign/developed/EUR/ALL
//   - commodities.derivatives/crypto/ETH@20260115/v2
//   - verified@reference.security/ISIN/US0378331005@latest
//   - securities/012345678@20260101/details.corporate.actions
//   - prices.equity/AAPL@3M (3-month lookback)
//   - moniker://holdings/20260115/fund_alpha?format=json

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::moniker::types::{percent_decode, Moniker, MonikerPath, QueryParams, VersionType};

/// Path segment: starts alphanumeric, then alphanumerics, hyphens,
/// underscores, or dots; at most 128 characters.
static SEGMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]{0,127}$").expect("invalid segment regex")
});

/// Namespace: starts with a letter, no dots (those belong to paths); at most
/// 64 characters.
static NAMESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_\-]{0,63}$").expect("invalid namespace regex")
});

/// Version: a bare alphanumeric token.
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("invalid version regex"));

static DATE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}$").expect("invalid date-version regex"));
static LOOKBACK_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)\d+[YMWD]$").expect("invalid lookback-version regex"));
static FREQUENCY_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)(daily|weekly|monthly)$").expect("invalid frequency-version regex")
});

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty moniker string")]
    EmptyInput,

    #[error("invalid scheme, expected 'moniker://' or no scheme: {input}")]
    InvalidScheme { input: String },

    #[error(
        "invalid path segment '{segment}': segments must start with an alphanumeric \
         and contain only alphanumerics, hyphens, underscores, or dots"
    )]
    InvalidSegment { segment: String },

    #[error(
        "invalid namespace '{namespace}': namespaces must start with a letter and \
         contain only alphanumerics, hyphens, or underscores"
    )]
    InvalidNamespace { namespace: String },

    #[error("invalid version '{version}': versions must be alphanumeric (e.g. 'latest', '20260115', '3M')")]
    InvalidVersion { version: String },

    #[error("invalid sub-resource part '{part}': parts must start with an alphanumeric")]
    InvalidSubResource { part: String },
}

/// Classify the semantic type of a version token.
pub fn classify_version(version: &str) -> Option<VersionType> {
    if version.is_empty() {
        return None;
    }
    if DATE_VERSION.is_match(version) {
        return Some(VersionType::Date);
    }
    if LOOKBACK_VERSION.is_match(version) {
        return Some(VersionType::Lookback);
    }
    if FREQUENCY_VERSION.is_match(version) {
        return Some(VersionType::Frequency);
    }
    match version.to_lowercase().as_str() {
        "latest" => Some(VersionType::Latest),
        "all" => Some(VersionType::All),
        _ => Some(VersionType::Custom),
    }
}

pub fn validate_segment(segment: &str) -> bool {
    SEGMENT_PATTERN.is_match(segment)
}

pub fn validate_namespace(namespace: &str) -> bool {
    NAMESPACE_PATTERN.is_match(namespace)
}

/// Parse a bare path string into a MonikerPath.
pub fn parse_path(path_str: &str, validate: bool) -> Result<MonikerPath, ParseError> {
    let clean = path_str.trim_matches('/');
    if clean.is_empty() {
        return Ok(MonikerPath::root());
    }

    let segments: Vec<String> = clean.split('/').map(str::to_string).collect();
    if validate {
        for segment in &segments {
            if !validate_segment(segment) {
                return Err(ParseError::InvalidSegment {
                    segment: segment.clone(),
                });
            }
        }
    }
    Ok(MonikerPath::new(segments))
}

/// Parse a full moniker string.
///
/// Accepts the `moniker://` scheme or the bare form; any other scheme is an
/// error. The parser never panics; all failures surface as [`ParseError`].
pub fn parse(moniker_str: &str, validate: bool) -> Result<Moniker, ParseError> {
    let moniker_str = moniker_str.trim();
    if moniker_str.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    // Scheme, then query string.
    let without_scheme = match moniker_str.strip_prefix("moniker://") {
        Some(rest) => rest,
        None if moniker_str.contains("://") => {
            return Err(ParseError::InvalidScheme {
                input: moniker_str.to_string(),
            })
        }
        None => moniker_str,
    };
    let (body, query_str) = match without_scheme.split_once('?') {
        Some((body, query)) => (body, Some(query)),
        None => (without_scheme, None),
    };

    // Namespace: the first '@', and only when it precedes any '/'. Every
    // other '@' is a version marker.
    let mut namespace = None;
    let mut remaining = body;
    if let Some(at) = body.find('@') {
        if body.find('/').is_none_or(|slash| at < slash) {
            let candidate = &body[..at];
            if validate && !validate_namespace(candidate) {
                return Err(ParseError::InvalidNamespace {
                    namespace: candidate.to_string(),
                });
            }
            namespace = Some(candidate.to_string());
            remaining = &body[at + 1..];
        }
    }

    // Revision: a trailing /vN (case-insensitive), greedy at the end only.
    let mut revision = None;
    if let Some(idx) = remaining.to_ascii_lowercase().rfind("/v") {
        let digits = &remaining[idx + 2..];
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(rev) = digits.parse::<u32>() {
                revision = Some(rev);
                remaining = &remaining[..idx];
            }
        }
    }

    // Version with optional sub-resource: @version[/sub.resource]
    let mut version: Option<String> = None;
    let mut sub_resource: Option<String> = None;
    if let Some(at) = remaining.rfind('@') {
        // With a namespace already extracted any '@' is a version marker;
        // otherwise it must come after the first '/'.
        let is_version_at = namespace.is_some()
            || remaining.find('/').is_none_or(|slash| at > slash);
        if is_version_at {
            let after_at = &remaining[at + 1..];
            let (version_part, sub_part) = match after_at.split_once('/') {
                Some((version_part, sub_part)) => (version_part, Some(sub_part)),
                None => (after_at, None),
            };

            if validate && !VERSION_PATTERN.is_match(version_part) {
                return Err(ParseError::InvalidVersion {
                    version: version_part.to_string(),
                });
            }
            if let Some(sub) = sub_part {
                // Multi-level sub-resources use dots; each dot-part must be
                // a valid segment on its own.
                if validate {
                    for part in sub.split('.') {
                        if !validate_segment(part) {
                            return Err(ParseError::InvalidSubResource {
                                part: part.to_string(),
                            });
                        }
                    }
                }
                sub_resource = Some(sub.to_string());
            }
            if !version_part.is_empty() {
                version = Some(version_part.to_string());
            }
            remaining = &remaining[..at];
        }
    }

    let path = parse_path(remaining, validate)?;

    let mut params = QueryParams::new();
    if let Some(query_str) = query_str {
        for pair in query_str.split('&') {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            // First value wins on repeated keys.
            params
                .entry(percent_decode(key))
                .or_insert_with(|| percent_decode(value));
        }
    }

    let version_type = version.as_deref().and_then(classify_version);

    Ok(Moniker {
        path,
        namespace,
        version,
        version_type,
        sub_resource,
        revision,
        params,
    })
}

/// Convenience wrapper around [`parse`] with validation enabled.
pub fn parse_moniker(moniker_str: &str) -> Result<Moniker, ParseError> {
    parse(moniker_str, true)
}
