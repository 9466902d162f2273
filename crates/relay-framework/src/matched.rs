//! Match results.
//!
//! A [`MatchResult`] is produced by the dispatcher for every filter that
//! matched an event. It is handed to the handler by value and dropped once the
//! invocation finishes.

use std::collections::BTreeMap;

use regex::{Captures as RegexCaptures, Regex};

use crate::error::HandlerError;

/// Named capture groups of a match.
///
/// Only named groups are surfaced. A named group that did not participate in
/// the match is present with an explicit `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(BTreeMap<String, Option<String>>);

impl Captures {
    /// Collects the named groups of `regex` from a successful match.
    pub(crate) fn from_regex(regex: &Regex, caps: &RegexCaptures<'_>) -> Self {
        Self(
            regex
                .capture_names()
                .flatten()
                .map(|name| {
                    (
                        name.to_string(),
                        caps.name(name).map(|m| m.as_str().to_string()),
                    )
                })
                .collect(),
        )
    }

    /// Returns the captured text of group `name`.
    ///
    /// `None` both when the group does not exist and when it did not take
    /// part in the match; use [`contains`](Self::contains) to tell them apart.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_deref())
    }

    /// Returns the captured text of group `name`, or an error suitable for
    /// returning from a handler.
    pub fn require(&self, name: &str) -> Result<&str, HandlerError> {
        self.get(name)
            .ok_or_else(|| HandlerError::MissingCapture(name.to_string()))
    }

    /// Returns `true` if the pattern declares a group called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of named groups.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the pattern declared no named groups.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for Captures
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.map(Into::into)))
                .collect(),
        )
    }
}

/// One successful filter match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    filter_name: String,
    pattern_index: usize,
    captures: Captures,
    full_match: String,
}

impl MatchResult {
    /// Creates a match result.
    pub fn new(
        filter_name: impl Into<String>,
        pattern_index: usize,
        captures: Captures,
        full_match: impl Into<String>,
    ) -> Self {
        Self {
            filter_name: filter_name.into(),
            pattern_index,
            captures,
            full_match: full_match.into(),
        }
    }

    /// The filter that matched.
    pub fn filter_name(&self) -> &str {
        &self.filter_name
    }

    /// Index of the pattern that matched within the filter's pattern list.
    pub fn pattern_index(&self) -> usize {
        self.pattern_index
    }

    /// Named capture groups.
    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    /// The substring matched by the whole pattern.
    pub fn full_match(&self) -> &str {
        &self.full_match
    }
}
