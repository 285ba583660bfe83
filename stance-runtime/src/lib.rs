//! Stance Runtime
//!
//! Wires a post source to the stance analyzer:
//! - **Sources**: Bluesky AppView or a saved raw posts file
//! - **Stores**: raw posts per handle, analysis results keyed by username
//! - **Pipeline**: profile lookup, collection, analysis, persistence

pub mod pipeline;
pub mod source;
pub mod store;

pub use pipeline::*;
pub use source::*;
pub use store::*;
