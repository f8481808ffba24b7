//! Streaming HTTP downloads into staged temporary files.
//!
//! # Architecture
//!
//! This crate follows the three-layer pattern:
//! - `data` - immutable configuration
//! - `core` - pure transformations (file naming, backoff)
//! - `effects` - I/O behind the [`HttpClient`] trait
//!
//! A [`Fetcher`] streams a response body chunk by chunk into a
//! [`sift_fs::TempFile`]. The payload is never held in memory, and every
//! failure path removes the partial file before returning. Retrying is left
//! to the caller.

mod core;
mod data;
mod effects;
mod error;

pub use self::core::{file_name_from_url, retry_delay};
pub use self::data::FetchOptions;
pub use self::effects::{BoxStream, Fetcher, HttpClient, TempArtifact, TransportFailure};

#[cfg(feature = "reqwest")]
pub use self::effects::ReqwestClient;

pub use self::error::{FetchError, Result};
