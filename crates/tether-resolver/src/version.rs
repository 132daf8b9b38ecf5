//! Semantic version parsing, ordering, and constraint matching.
//!
//! Versions are plain `major.minor.patch` triples. Pre-release (`-rc.1`) and
//! build (`+sha.1`) suffixes on the patch component are accepted and dropped,
//! so `1.2.3-rc.1` and `1.2.3` are the same version here.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::VersionError;

/// A parsed `major.minor.patch` version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemanticVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let trimmed = text.trim();
        let invalid = || VersionError::InvalidVersion(text.to_string());

        let parts: Vec<&str> = trimmed.splitn(3, '.').collect();
        if parts.len() != 3 {
            return Err(invalid());
        }
        // Only the patch component may carry `-pre` / `+build`.
        let patch = parts[2]
            .split(['-', '+'])
            .next()
            .unwrap_or_default();

        Ok(Self {
            major: parse_component(parts[0]).ok_or_else(invalid)?,
            minor: parse_component(parts[1]).ok_or_else(invalid)?,
            patch: parse_component(patch).ok_or_else(invalid)?,
        })
    }

    /// Three-way comparison over (major, minor, patch).
    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl Serialize for SemanticVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Comparison operator of a [`VersionConstraint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Exact,
    Caret,
    Tilde,
    GreaterEq,
    Greater,
    LessEq,
    Less,
}

impl Operator {
    fn as_str(self) -> &'static str {
        match self {
            Operator::Exact => "=",
            Operator::Caret => "^",
            Operator::Tilde => "~",
            Operator::GreaterEq => ">=",
            Operator::Greater => ">",
            Operator::LessEq => "<=",
            Operator::Less => "<",
        }
    }
}

// Two-character operators must be tried before their one-character prefixes.
const OPERATORS: [(&str, Operator); 7] = [
    (">=", Operator::GreaterEq),
    ("<=", Operator::LessEq),
    (">", Operator::Greater),
    ("<", Operator::Less),
    ("^", Operator::Caret),
    ("~", Operator::Tilde),
    ("=", Operator::Exact),
];

/// An operator plus a version, e.g. `^1.2.3` or `>=2.0.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionConstraint {
    pub operator: Operator,
    pub version: SemanticVersion,
}

impl VersionConstraint {
    pub fn new(operator: Operator, version: SemanticVersion) -> Self {
        Self { operator, version }
    }

    /// Shorthand for an `=` constraint.
    pub fn exact(version: SemanticVersion) -> Self {
        Self::new(Operator::Exact, version)
    }

    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(VersionError::InvalidConstraint(text.to_string()));
        }

        let (operator, rest) = OPERATORS
            .iter()
            .find_map(|(token, op)| trimmed.strip_prefix(token).map(|rest| (*op, rest)))
            .unwrap_or((Operator::Exact, trimmed));

        let version = SemanticVersion::parse(rest)
            .map_err(|_| VersionError::InvalidConstraint(text.to_string()))?;
        Ok(Self { operator, version })
    }

    /// Whether `candidate` satisfies this constraint.
    pub fn satisfies(&self, candidate: &SemanticVersion) -> bool {
        let v = &self.version;
        match self.operator {
            Operator::Exact => candidate == v,
            Operator::GreaterEq => candidate >= v,
            Operator::Greater => candidate > v,
            Operator::LessEq => candidate <= v,
            Operator::Less => candidate < v,
            Operator::Tilde => {
                candidate.major == v.major && candidate.minor == v.minor && candidate.patch >= v.patch
            }
            Operator::Caret => {
                if v.major > 0 {
                    candidate.major == v.major && candidate >= v
                } else if v.minor > 0 {
                    candidate.major == 0 && candidate.minor == v.minor && candidate.patch >= v.patch
                } else {
                    candidate == v
                }
            }
        }
    }
}

impl FromStr for VersionConstraint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.version)
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VersionConstraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
