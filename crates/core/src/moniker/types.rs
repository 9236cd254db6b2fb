// Moniker value types - hierarchical path, version classification, and the
// parsed reference itself. The Display impls produce the canonical form.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Query parameters carried by a moniker. A BTreeMap keeps the canonical
/// string form deterministic: parameters always render sorted by key.
pub type QueryParams = BTreeMap<String, String>;

/// Semantic classification of a version specifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    /// `@20260101` (YYYYMMDD)
    Date,
    /// `@3M`, `@12Y`, `@1W`, `@5D`
    Lookback,
    /// `@daily`, `@weekly`, `@monthly`
    Frequency,
    /// `@latest`
    Latest,
    /// `@all` (full series)
    All,
    /// Source-specific identifier
    Custom,
}

/// Hierarchical path to a data asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MonikerPath {
    pub segments: Vec<String>,
}

impl MonikerPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Split a canonical slash-separated string without validation.
    pub fn from_canonical(path: &str) -> Self {
        let clean = path.trim_matches('/');
        if clean.is_empty() {
            return Self::root();
        }
        Self {
            segments: clean.split('/').map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// First segment (the data domain).
    pub fn domain(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// Final segment.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<MonikerPath> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// All ancestor paths from root to parent, not including self.
    pub fn ancestors(&self) -> Vec<MonikerPath> {
        (1..self.segments.len())
            .map(|i| Self {
                segments: self.segments[..i].to_vec(),
            })
            .collect()
    }

    pub fn child(&self, segment: impl Into<String>) -> MonikerPath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn is_ancestor_of(&self, other: &MonikerPath) -> bool {
        self.segments.len() < other.segments.len()
            && self.segments == other.segments[..self.segments.len()]
    }
}

impl fmt::Display for MonikerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// A fully parsed moniker reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Moniker {
    pub path: MonikerPath,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub version_type: Option<VersionType>,
    #[serde(default)]
    pub sub_resource: Option<String>,
    #[serde(default)]
    pub revision: Option<u32>,
    #[serde(default)]
    pub params: QueryParams,
}

impl Moniker {
    /// The path portion alone, without namespace, version, or params.
    pub fn canonical_path(&self) -> String {
        self.path.to_string()
    }

    /// Path including version, sub-resource, and revision but not namespace.
    pub fn full_path(&self) -> String {
        let mut out = self.path.to_string();
        if let Some(version) = &self.version {
            out.push('@');
            out.push_str(version);
        }
        if let Some(sub) = &self.sub_resource {
            out.push('/');
            out.push_str(sub);
        }
        if let Some(rev) = self.revision {
            out.push_str(&format!("/v{rev}"));
        }
        out
    }

    pub fn is_versioned(&self) -> bool {
        self.version.is_some()
    }

    pub fn is_latest(&self) -> bool {
        self.version_type == Some(VersionType::Latest)
    }

    pub fn is_all(&self) -> bool {
        self.version_type == Some(VersionType::All)
    }

    /// The version value when it is a YYYYMMDD date.
    pub fn version_date(&self) -> Option<&str> {
        if self.version_type == Some(VersionType::Date) {
            self.version.as_deref()
        } else {
            None
        }
    }

    /// Lookback components `(value, unit)` with unit in `Y/M/W/D`.
    pub fn version_lookback(&self) -> Option<(u32, char)> {
        if self.version_type != Some(VersionType::Lookback) {
            return None;
        }
        let version = self.version.as_deref()?;
        let (digits, unit) = version.split_at(version.len() - 1);
        let value = digits.parse().ok()?;
        Some((value, unit.chars().next()?.to_ascii_uppercase()))
    }

    /// Lowercased frequency (`daily`, `weekly`, `monthly`).
    pub fn version_frequency(&self) -> Option<String> {
        if self.version_type == Some(VersionType::Frequency) {
            self.version.as_deref().map(str::to_lowercase)
        } else {
            None
        }
    }
}

impl fmt::Display for Moniker {
    /// Canonical form:
    /// `moniker://[ns@]path[@version][/sub][/vN][?sorted_params]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("moniker://")?;
        if let Some(namespace) = &self.namespace {
            write!(f, "{namespace}@")?;
        }
        f.write_str(&self.full_path())?;
        if !self.params.is_empty() {
            let query = self
                .params
                .iter()
                .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

pub(crate) fn percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        let is_unreserved =
            byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~');
        if is_unreserved {
            encoded.push(char::from(byte));
        } else {
            encoded.push('%');
            encoded.push_str(&format!("{byte:02X}"));
        }
    }
    encoded
}

pub(crate) fn percent_decode(value: &str) -> String {
    fn hex_val(byte: u8) -> Option<u8> {
        match byte {
            b'0'..=b'9' => Some(byte - b'0'),
            b'a'..=b'f' => Some(byte - b'a' + 10),
            b'A'..=b'F' => Some(byte - b'A' + 10),
            _ => None,
        }
    }

    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                if let (Some(hi), Some(lo)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    decoded.push(hi << 4 | lo);
                    i += 3;
                    continue;
                }
                decoded.push(b'%');
                i += 1;
            }
            b'+' => {
                decoded.push(b' ');
                i += 1;
            }
            byte => {
                decoded.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}
