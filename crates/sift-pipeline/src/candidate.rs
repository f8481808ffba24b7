use serde::Serialize;
use sift_fetch::{FetchError, file_name_from_url};

/// One manifest row awaiting processing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CandidateResource {
    pub url:            String,
    pub suggested_name: String,
}

impl CandidateResource {
    /// Build a candidate whose name is the URL's last path segment.
    ///
    /// ```
    /// use sift_pipeline::CandidateResource;
    ///
    /// let c = CandidateResource::from_url("https://example.com/2023/a.jpg?v=2").unwrap();
    /// assert_eq!(c.suggested_name, "a.jpg");
    /// ```
    pub fn from_url(url: impl Into<String>) -> Result<Self, FetchError> {
        let url = url.into().trim().to_string();
        let suggested_name = file_name_from_url(&url)?;
        Ok(Self { url, suggested_name })
    }
}
