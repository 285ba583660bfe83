//! Stance Bluesky
//!
//! Collects posts from the public Bluesky AppView:
//! - HTTP client with timeout and retry settings
//! - Profile lookup
//! - Paginated author feed with duplicate skipping and jittered retries
//! - Entity extraction from rich-text facets

pub mod api;
pub mod client;
pub mod config;
pub mod post;

pub use client::*;
pub use config::*;
pub use post::*;
