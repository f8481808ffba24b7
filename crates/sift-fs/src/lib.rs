//! Filesystem primitives for the fetch pipeline.
//!
//! - [`Staging`] hands out uniquely named [`TempFile`]s that are removed on
//!   drop unless they were placed.
//! - [`TempFile::place`] moves a staged file into a directory without ever
//!   replacing an existing file, picking `name-1.ext`, `name-2.ext`, ... on
//!   collision.
//! - [`list_files`] enumerates the regular files of a directory.

mod error;
mod place;
mod staging;

pub use error::{Error, Result};
pub use place::{MAX_SUFFIX, disambiguate, list_files};
pub use staging::{Staging, TempFile};
