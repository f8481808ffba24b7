use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Classification hooks for client errors.
///
/// The fetcher reports every client error as a transport failure; these
/// accessors let it keep the HTTP status and timeout flag.
pub trait TransportFailure: std::error::Error + Send + Sync + 'static {
    /// Status code when the server answered with a non-success status.
    fn status(&self) -> Option<u16> { None }

    fn is_timeout(&self) -> bool { false }
}

/// Asynchronous HTTP client abstraction.
///
/// # Implementations
///
/// - [`ReqwestClient`]: production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    type Error: TransportFailure;

    /// Issue a GET and return the response body as a stream of chunks.
    ///
    /// # Errors
    ///
    /// Implementations must fail here, before yielding any body bytes, when
    /// the server answers with a non-2xx status.
    fn stream(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> impl Future<
        Output = std::result::Result<
            BoxStream<'static, std::result::Result<Bytes, Self::Error>>,
            Self::Error,
        >,
    > + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::StreamExt;

    use super::*;
    use crate::data::FetchOptions;

    impl TransportFailure for reqwest::Error {
        fn status(&self) -> Option<u16> { reqwest::Error::status(self).map(|s| s.as_u16()) }

        fn is_timeout(&self) -> bool { reqwest::Error::is_timeout(self) }
    }

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new(options: &FetchOptions) -> Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder()
                .connect_timeout(options.connect_timeout)
                .timeout(options.request_timeout)
                .user_agent(options.user_agent.clone())
                .build()?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(
            &self,
            url: &str,
            headers: &[(String, String)],
        ) -> std::result::Result<BoxStream<'static, std::result::Result<Bytes, Self::Error>>, Self::Error>
        {
            let mut request = self.client.get(url);
            for (key, value) in headers {
                request = request.header(key, value);
            }

            let response = request.send().await?.error_for_status()?;
            Ok(response.bytes_stream().boxed())
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
