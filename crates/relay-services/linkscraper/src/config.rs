//! Link scraper settings, read from the `[link_scraper]` section.

use serde::{Deserialize, Serialize};

/// Settings for [`LinkScraperService`](crate::LinkScraperService).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkScraperConfig {
    /// Collector endpoint. Without it, links are only logged.
    #[serde(default)]
    pub post_url: Option<String>,
}
