//! # Relay Link Scraper
//!
//! Watches every conversation for URLs and forwards each one, with the
//! sender, to an HTTP collector as `{"url": ..., "person": ...}`.
//!
//! ```rust,ignore
//! let service = Arc::new(LinkScraperService::new(config.section("link_scraper")?, publish));
//! let builder = service.register(RegistryBuilder::new());
//! ```

pub mod config;
pub mod filters;
pub mod service;

pub use config::LinkScraperConfig;
pub use filters::LinkFilter;
pub use service::LinkScraperService;
