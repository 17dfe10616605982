//! Remote feed access for template packages.
//!
//! A feed is a plain HTTP location: an [`index.json`](INDEX_FILE)
//! document listing packages and versions, with archive files alongside
//! it. [`HttpFeedClient`] implements both acquisition
//! ([`FeedDownloader`](crate::installer::FeedDownloader)) and
//! latest-version lookups ([`UpdateFeed`](crate::installer::UpdateFeed))
//! over that layout. Feed protocol negotiation beyond this is out of
//! scope; richer feed kinds plug in their own trait implementations.

mod client;
mod index;

pub use client::HttpFeedClient;
pub use index::{FeedIndex, IndexEntry, INDEX_FILE};
