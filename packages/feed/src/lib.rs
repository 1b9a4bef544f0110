#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! 311 feed ingestion: CSV decoding, normalization, and the fetch cache.
//!
//! Raw feed text flows through [`csv::decode`] into [`pipeline::normalize`],
//! which produces the bounded most-recent-first record set consumed by every
//! view. [`fetch::FeedCache`] owns the one fetch per session and exposes the
//! loading/error/ready states around it.

pub mod csv;
pub mod fetch;
pub mod pipeline;

/// Errors that can occur while fetching or decoding the feed.
///
/// These are whole-batch failures — per-row problems are absorbed inside
/// the pipeline and only show up as skipped rows in the log.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// HTTP request failed or returned a non-success status.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The feed text was unreadable or empty.
    #[error("feed decode failed: {message}")]
    Decode {
        /// Description of what went wrong.
        message: String,
    },

    /// Reading a local feed file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
