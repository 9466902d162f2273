//! HTTP collaborators.
//!
//! [`HttpClient`] implements both [`Fetch`](relay_core::Fetch) and
//! [`Publish`](relay_core::Publish) on top of one pooled `reqwest` client.

mod client;
mod status;

pub use client::{HttpClient, HttpClientConfig};
pub use status::{StatusClass, classify_status};
