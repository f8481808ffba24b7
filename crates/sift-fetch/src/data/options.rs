use std::sync::Arc;
use std::time::Duration;

/// Configuration for HTTP fetching.
///
/// # Examples
///
/// ```
/// use sift_fetch::FetchOptions;
/// use std::time::Duration;
///
/// let options = FetchOptions::default()
///     .request_timeout(Duration::from_secs(20))
///     .header("Referer", "https://example.com/");
/// ```
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Limit on establishing the TCP/TLS connection.
    ///
    /// Default: 30s
    pub connect_timeout: Duration,

    /// Limit on the whole request, body included.
    ///
    /// Default: 120s
    pub request_timeout: Duration,

    /// `User-Agent` sent with every request.
    pub user_agent: String,

    /// Extra headers sent with every request.
    ///
    /// Default: empty
    pub headers: Arc<[(String, String)]>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(120),
            user_agent:      concat!("imgsift/", env!("CARGO_PKG_VERSION")).to_string(),
            headers:         Arc::new([]),
        }
    }
}

impl FetchOptions {
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a single custom HTTP header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut headers: Vec<_> = self.headers.iter().cloned().collect();
        headers.push((key.into(), value.into()));
        self.headers = Arc::from(headers);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FetchOptions::default();
        assert_eq!(options.connect_timeout, Duration::from_secs(30));
        assert!(options.headers.is_empty());
        assert!(options.user_agent.starts_with("imgsift/"));
    }

    #[test]
    fn test_headers_accumulate() {
        let options = FetchOptions::default().header("A", "1").header("B", "2");
        assert_eq!(
            &options.headers[..],
            &[("A".to_string(), "1".to_string()), ("B".to_string(), "2".to_string())]
        );
    }
}
