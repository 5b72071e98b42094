//! Ferment Core - Shared Foundation
//!
//! Types every other Ferment crate builds on:
//!
//! - `identifiers`: `Identity` and `MessageId` opaque string handles
//! - `errors`: the unified `FermentError`
//! - `config`: `FermentConfig` loading, env overlay and validation
//! - `reactive`: `Dynamic`, `Computed` and the `Observable`/`Source` traits
//!
//! This crate performs no I/O beyond reading a configuration file.

#![forbid(unsafe_code)]

/// Session configuration
pub mod config;

/// Unified error handling
pub mod errors;

/// Identity and message identifiers
pub mod identifiers;

/// Versioned cells and lazily derived values
pub mod reactive;

pub use config::{BridgeConfig, FermentConfig, FriendsConfig};
pub use errors::{FermentError, Result};
pub use identifiers::{Identity, MessageId, PostId};
pub use reactive::{Computed, Dynamic, Observable, SharedSource, Source, Subscription};
