//! Link forwarding.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use relay_core::{BoxedPublish, InboundEvent};
use relay_framework::{HandlerResult, MatchResult, RegistryBuilder};

use crate::config::LinkScraperConfig;
use crate::filters::LinkFilter;

/// Forwards posted links through a [`Publish`](relay_core::Publish) collaborator.
pub struct LinkScraperService {
    post_url: Option<String>,
    publish: BoxedPublish,
}

impl std::fmt::Debug for LinkScraperService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkScraperService")
            .field("post_url", &self.post_url)
            .finish_non_exhaustive()
    }
}

impl LinkScraperService {
    /// Creates the service. A blank `post_url` counts as absent.
    pub fn new(config: LinkScraperConfig, publish: BoxedPublish) -> Self {
        let post_url = config
            .post_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        if post_url.is_none() {
            warn!("link_scraper.post_url is not set, links will not be forwarded");
        }
        Self { post_url, publish }
    }

    /// Registers the `link_posted` filter.
    pub fn register(self: Arc<Self>, builder: RegistryBuilder) -> RegistryBuilder {
        builder.route(
            LinkFilter::Posted.spec(),
            move |matched: MatchResult, event: InboundEvent| {
                let service = Arc::clone(&self);
                async move { service.forward(matched.full_match(), &event.sender_id).await }
            },
        )
    }

    /// Posts `link` on behalf of `person`.
    ///
    /// The collector's status is only logged; a failed POST is the
    /// invocation's error.
    pub async fn forward(&self, link: &str, person: &str) -> HandlerResult {
        let Some(post_url) = self.post_url.as_deref() else {
            debug!(link, "No post_url configured, not forwarding");
            return Ok(());
        };

        let url = strip_parens(link);
        let status = self
            .publish
            .post_json(post_url, json!({ "url": url, "person": person }))
            .await?;
        debug!(url, post_url, status, "Posted link");
        Ok(())
    }
}

/// Drops the opening parenthesis the pattern may capture, and its partner.
fn strip_parens(link: &str) -> &str {
    match link.strip_prefix('(') {
        Some(inner) => inner.strip_suffix(')').unwrap_or(inner),
        None => link,
    }
}
