//! The link scraper's filter.

use relay_framework::FilterSpec;

/// Filters registered by the link scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkFilter {
    /// Any http(s) URL, optionally opened by a parenthesis.
    Posted,
}

impl LinkFilter {
    /// The filter name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Posted => "link_posted",
        }
    }

    /// The pattern source.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Posted => {
                r"\(?\b(http|https)://[-A-Za-z0-9+&@#/%?=~_()|!:,.;]*[-A-Za-z0-9+&@#/%=~_()|]"
            }
        }
    }

    /// The declarative filter. Matches in public and direct conversations.
    pub fn spec(self) -> FilterSpec {
        FilterSpec::new(self.name(), [self.pattern()])
    }
}
