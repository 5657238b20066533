//! Quote provider abstractions and implementations.
//!
//! This module contains:
//! - The `QuoteProvider` trait that all quote sources implement
//! - The concrete Yahoo Finance implementation
//!
//! # Architecture
//!
//! The provider system is designed to be:
//! - **Provider-agnostic**: Callers hold a `dyn QuoteProvider` and never see transport details
//! - **Decoratable**: Throttling and retry wrap the trait rather than living in each provider
//!
//! Symbol normalization (exchange-prefix and suffix rewrites) happens inside
//! the provider that needs it; callers always pass the canonical symbol.

mod traits;

pub mod yahoo;

pub use traits::QuoteProvider;
