//! Filter specifications and the pattern compiler.
//!
//! A [`FilterSpec`] is the declarative form of a filter: a name, an ordered
//! list of regular-expression sources and a direct-only flag. [`compile`]
//! turns a list of specs into [`CompiledFilter`]s once at startup; a malformed
//! pattern fails loudly there, carrying the filter name and the pattern
//! source, instead of at first use.
//!
//! Patterns use search semantics: a match may start anywhere in the text.
//! Anchor with `^`/`$` where a whole-message match is wanted. A filter may
//! also carry exclusions: text matched by any of them is never claimed by
//! the filter, whichever pattern would otherwise accept it.
//!
//! ```rust,ignore
//! let specs = vec![
//!     FilterSpec::new("forecast", [r"^forecast (for\s)?(?P<loc>(.*))$"]).direct_only(true),
//!     FilterSpec::new("link_posted", [r"\b(http|https)://\S+"]),
//! ];
//! let filters = compile(&specs)?;
//! ```

use std::collections::HashSet;

use regex::Regex;
use relay_core::InboundEvent;

use crate::error::{FilterError, FilterResult};
use crate::matched::{Captures, MatchResult};

/// Declarative description of a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    name: String,
    patterns: Vec<String>,
    exclusions: Vec<String>,
    direct_only: bool,
}

impl FilterSpec {
    /// Creates a filter that is eligible for every event.
    pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            patterns: patterns.into_iter().map(Into::into).collect(),
            exclusions: Vec::new(),
            direct_only: false,
        }
    }

    /// Adds a pattern whose matches the filter must not claim.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclusions.push(pattern.into());
        self
    }

    /// Restricts the filter to direct messages.
    pub fn direct_only(mut self, direct_only: bool) -> Self {
        self.direct_only = direct_only;
        self
    }

    /// The filter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern sources, in evaluation order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// The exclusion sources.
    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    /// Whether the filter only applies to direct messages.
    pub fn is_direct_only(&self) -> bool {
        self.direct_only
    }

    fn regex(&self, pattern: &str) -> FilterResult<Regex> {
        Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
            filter: self.name.clone(),
            pattern: pattern.to_owned(),
            source,
        })
    }

    /// Compiles this spec on its own.
    pub fn compile(&self) -> FilterResult<CompiledFilter> {
        if self.patterns.is_empty() {
            return Err(FilterError::EmptyPatterns {
                filter: self.name.clone(),
            });
        }

        let matchers = self
            .patterns
            .iter()
            .map(|pattern| self.regex(pattern))
            .collect::<FilterResult<Vec<_>>>()?;
        let exclusions = self
            .exclusions
            .iter()
            .map(|pattern| self.regex(pattern))
            .collect::<FilterResult<Vec<_>>>()?;

        Ok(CompiledFilter {
            name: self.name.clone(),
            matchers,
            exclusions,
            direct_only: self.direct_only,
        })
    }
}

/// A filter with its patterns compiled.
///
/// Immutable once built; safe to share across tasks without locking.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    name: String,
    matchers: Vec<Regex>,
    exclusions: Vec<Regex>,
    direct_only: bool,
}

impl CompiledFilter {
    /// The filter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The compiled matchers, in source order.
    pub fn matchers(&self) -> &[Regex] {
        &self.matchers
    }

    /// Whether the filter only applies to direct messages.
    pub fn is_direct_only(&self) -> bool {
        self.direct_only
    }

    /// Returns `true` if the event may be tested against this filter at all.
    pub fn is_eligible(&self, event: &InboundEvent) -> bool {
        !self.direct_only || event.is_direct
    }

    /// Searches `text` with each matcher in order and returns the match of the
    /// first one that succeeds. Later patterns are not tried.
    ///
    /// Empty text never matches, nor does text hit by an exclusion.
    pub fn find(&self, text: &str) -> Option<MatchResult> {
        if text.is_empty() || self.exclusions.iter().any(|regex| regex.is_match(text)) {
            return None;
        }

        self.matchers
            .iter()
            .enumerate()
            .find_map(|(index, regex)| {
                let caps = regex.captures(text)?;
                let full_match = caps.get(0).map_or("", |m| m.as_str());
                Some(MatchResult::new(
                    self.name.clone(),
                    index,
                    Captures::from_regex(regex, &caps),
                    full_match,
                ))
            })
    }
}

/// Compiles every spec, preserving order.
///
/// Fails on the first malformed pattern, on an empty pattern list, or on a
/// repeated filter name.
pub fn compile(specs: &[FilterSpec]) -> FilterResult<Vec<CompiledFilter>> {
    let mut seen = HashSet::new();
    specs
        .iter()
        .map(|spec| {
            if !seen.insert(spec.name()) {
                return Err(FilterError::DuplicateFilter {
                    filter: spec.name.clone(),
                });
            }
            spec.compile()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_specs() -> Vec<FilterSpec> {
        vec![
            FilterSpec::new(
                "weather_alerts",
                [r"^(current\s)?weather alerts (for\s)?(?P<loc>(.*))$"],
            )
            .direct_only(true),
            FilterSpec::new("forecast", [r"^forecast (for\s)?(?P<loc>(.*))$"]).direct_only(true),
        ]
    }

    #[test]
    fn test_compile_preserves_order_and_flags() {
        let filters = compile(&weather_specs()).unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].name(), "weather_alerts");
        assert_eq!(filters[1].name(), "forecast");
        assert!(filters.iter().all(CompiledFilter::is_direct_only));
        assert_eq!(filters[0].matchers().len(), 1);
    }

    #[test]
    fn test_invalid_pattern_names_filter_and_source() {
        let specs = vec![
            FilterSpec::new("ok", ["^ok$"]),
            FilterSpec::new("broken", ["^fine$", "(?P<loc>unclosed"]),
        ];
        match compile(&specs) {
            Err(FilterError::InvalidPattern {
                filter, pattern, ..
            }) => {
                assert_eq!(filter, "broken");
                assert_eq!(pattern, "(?P<loc>unclosed");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_pattern_list_rejected() {
        let specs = vec![FilterSpec::new("nothing", Vec::<String>::new())];
        assert!(matches!(
            compile(&specs),
            Err(FilterError::EmptyPatterns { filter }) if filter == "nothing"
        ));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let specs = vec![
            FilterSpec::new("dup", ["a"]),
            FilterSpec::new("dup", ["b"]),
        ];
        assert!(matches!(
            compile(&specs),
            Err(FilterError::DuplicateFilter { filter }) if filter == "dup"
        ));
    }

    #[test]
    fn test_compiling_twice_behaves_identically() {
        let specs = weather_specs();
        let first = compile(&specs).unwrap();
        let second = compile(&specs).unwrap();

        for text in [
            "weather alerts Portland",
            "weather alerts for 97201",
            "forecast for Boston",
            "forecast",
            "hello",
            "",
        ] {
            for (a, b) in first.iter().zip(&second) {
                assert_eq!(a.find(text), b.find(text), "diverged on {text:?}");
            }
        }
    }

    #[test]
    fn test_first_pattern_wins_within_filter() {
        let filter = FilterSpec::new("greeting", [r"(?P<word>hello)", r"(?P<word>hello world)"])
            .compile()
            .unwrap();
        let matched = filter.find("hello world").unwrap();
        assert_eq!(matched.pattern_index(), 0);
        assert_eq!(matched.full_match(), "hello");
        assert_eq!(matched.captures().get("word"), Some("hello"));
    }

    #[test]
    fn test_later_pattern_used_when_earlier_fails() {
        let filter = FilterSpec::new("either", [r"^never$", r"sea(?P<rest>\w+)"])
            .compile()
            .unwrap();
        let matched = filter.find("visit seattle").unwrap();
        assert_eq!(matched.pattern_index(), 1);
        assert_eq!(matched.full_match(), "seattle");
        assert_eq!(matched.captures().get("rest"), Some("ttle"));
    }

    #[test]
    fn test_named_capture_extraction() {
        let filter = FilterSpec::new("weather", [r"^weather (?P<loc>.*)$"])
            .compile()
            .unwrap();
        let matched = filter.find("weather Seattle").unwrap();
        let expected: Captures = [("loc", Some("Seattle"))].into_iter().collect();
        assert_eq!(matched.captures(), &expected);
        assert_eq!(matched.full_match(), "weather Seattle");
    }

    #[test]
    fn test_no_named_groups_gives_empty_captures() {
        let filter = FilterSpec::new("ping", [r"^(ping|pong)$"]).compile().unwrap();
        let matched = filter.find("ping").unwrap();
        assert!(matched.captures().is_empty());
    }

    #[test]
    fn test_empty_text_never_matches() {
        let filter = FilterSpec::new("anything", [r".*"]).compile().unwrap();
        assert!(filter.find("").is_none());
        assert!(filter.find("x").is_some());
    }

    #[test]
    fn test_search_semantics_do_not_anchor() {
        let filter = FilterSpec::new("link", [r"\b(http|https)://\S+"])
            .compile()
            .unwrap();
        let matched = filter.find("look at https://example.com now").unwrap();
        assert_eq!(matched.full_match(), "https://example.com");
    }

    #[test]
    fn test_exclusion_blocks_overlapping_command() {
        let filter = FilterSpec::new(
            "current_weather",
            [r"^(current\s)?weather (for\s)?(?P<loc>(.*))$"],
        )
        .exclude(r"^(current\s)?weather alerts ")
        .compile()
        .unwrap();
        assert!(filter.find("weather alerts Portland").is_none());
        assert!(filter.find("current weather alerts for 97201").is_none());

        let matched = filter.find("weather Portland").unwrap();
        assert_eq!(matched.captures().get("loc"), Some("Portland"));
        // Only the exact prefix is excluded.
        assert!(filter.find("weather alertsville").is_some());
    }

    #[test]
    fn test_invalid_exclusion_rejected() {
        let specs = vec![FilterSpec::new("guarded", ["^ok$"]).exclude("(unclosed")];
        match compile(&specs) {
            Err(FilterError::InvalidPattern {
                filter, pattern, ..
            }) => {
                assert_eq!(filter, "guarded");
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("expected InvalidPattern, got {other:?}"),
        }
    }

    #[test]
    fn test_eligibility() {
        let filter = FilterSpec::new("private", ["x"])
            .direct_only(true)
            .compile()
            .unwrap();
        assert!(!filter.is_eligible(&InboundEvent::public("x", "u", "#c")));
        assert!(filter.is_eligible(&InboundEvent::direct("x", "u")));
    }
}
