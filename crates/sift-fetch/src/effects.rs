//! I/O: the HTTP client seam and the streaming fetcher.

mod fetcher;
mod http;

pub use fetcher::{Fetcher, TempArtifact};
pub use http::{BoxStream, HttpClient, TransportFailure};

#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
