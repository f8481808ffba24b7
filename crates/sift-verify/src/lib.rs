//! Content fingerprints for fetched artifacts.
//!
//! A [`Fingerprint`] is the SHA-256 digest of a resource's full byte content
//! and serves as its identity for deduplication. Inputs are hashed
//! incrementally in fixed-size chunks, so memory use does not depend on the
//! size of the resource.
//!
//! # Example
//!
//! ```
//! use sift_verify::{Fingerprint, fingerprint_reader};
//!
//! let data = b"hello world";
//! let fp = fingerprint_reader(&data[..]).unwrap();
//!
//! assert_eq!(fp, Fingerprint::of(data));
//! assert_eq!(
//!     fp.to_string(),
//!     "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
//! );
//! ```

pub use self::error::{Result, VerifyError};
pub use self::fingerprint::{CHUNK_SIZE, Fingerprint, fingerprint_file, fingerprint_reader};
pub use self::hasher::{Hasher, Sha256Hasher};

mod error;
mod fingerprint;
mod hasher;
