//! Ferment Social - Feeds and Publishing
//!
//! This crate turns a social graph (follows, posts, likes, reposts) into live,
//! ordered feeds and turns user actions into append-only log messages.
//!
//! # Architecture
//!
//! - `store` / `log`: boundaries to the external profile store and log client
//! - `init` / `readiness`: lazy, exactly-once store construction and the
//!   readiness gate consumers can hold before the store exists
//! - `feeds`: recency sort, reversal and follow-union projections plus the
//!   id-to-handle lookup, composed into discovery/following/profile/liked feeds
//! - `actions`: message schema and the publisher
//! - `bridge` / `blobs`: call-id correlation across the process boundary and
//!   blob ingestion on top of it
//! - `transfer`: live status of a background file transfer
//! - `api`: the per-session facade
//!
//! # Example
//!
//! ```ignore
//! use ferment_social::FermentApi;
//!
//! let api = FermentApi::new(log_client, config, store_factory, blob_transport);
//!
//! // Nothing is built until the first accessor runs.
//! let feed = api.following_feed()?;
//! if !feed.is_ready() {
//!     api.ready().await?;
//! }
//! for post in feed.resolved() {
//!     println!("{} @ {}", post.id, post.timestamp());
//! }
//!
//! api.actions().like(&post_id).await?;
//! ```

#![forbid(unsafe_code)]

pub mod actions;
pub mod api;
pub mod blobs;
pub mod bridge;
pub mod feeds;
pub mod init;
pub mod log;
pub mod profile;
pub mod readiness;
pub mod store;
pub mod transfer;

pub use actions::{ActionMessage, ActionPublisher, Link, LinkKind, PublishCallback};
pub use api::FermentApi;
pub use blobs::{blob_url, AddBlobRequest, AddBlobResponse, BlobBridge, BlobGateway, BlobSource};
pub use bridge::{BridgeTransport, CallId, CorrelationBridge, PendingCall};
pub use feeds::{FeedService, ItemLookup, ResolvedFeed};
pub use init::StoreInitializer;
pub use log::LogClient;
pub use profile::{PostHandle, Profile};
pub use readiness::ReadinessGate;
pub use store::{PostLookup, ProfileLookup, ProfileStore, StoreFactory};
pub use transfer::TransferStatus;
