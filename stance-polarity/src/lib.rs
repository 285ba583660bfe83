//! Stance Polarity
//!
//! Word-list sentiment polarity for the stance engine. [`LexiconPolarity`]
//! implements [`stance_core::PolarityProvider`] and can be shared as a
//! [`stance_core::SharedPolarity`].

pub mod lexicon;
pub mod provider;

pub use lexicon::*;
pub use provider::*;
