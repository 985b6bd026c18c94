//! Shared test utilities for the cfgweave workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixture`]: [`ConfigFixture`] builder for configuration files on disk

pub mod fixture;

pub use fixture::ConfigFixture;
