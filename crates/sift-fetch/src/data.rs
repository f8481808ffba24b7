//! Immutable configuration for fetch operations.

mod options;

pub use options::FetchOptions;
