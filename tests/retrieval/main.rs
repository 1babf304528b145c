//! Retrieval Pipeline Test Suite
//!
//! End-to-end coverage of the `Retriever` facade: ranking scenarios, output
//! budget, caching, collaborator outages, deadlines, and snapshot swaps.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run the whole suite
//! cargo test --test retrieval
//!
//! # Degradation paths only
//! cargo test --test retrieval degradation::
//! ```

mod common;

mod caching;
mod config;
mod degradation;
mod pipeline;
mod properties;
