use url::Url;

use crate::error::{FetchError, Result};

/// File name for a downloaded resource: the last segment of the URL path,
/// with query string and fragment removed.
///
/// Fails with [`FetchError::InvalidUrl`] if the URL does not parse, is not
/// `http`/`https`, or its path yields an empty name.
///
/// # Examples
///
/// ```
/// use sift_fetch::file_name_from_url;
///
/// assert_eq!(
///     file_name_from_url("https://cdn.example.com/2023/plates/AB123.jpg?w=640").unwrap(),
///     "AB123.jpg"
/// );
/// assert!(file_name_from_url("https://cdn.example.com/plates/").is_err());
/// ```
pub fn file_name_from_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::invalid_url(url, e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::invalid_url(
            url,
            format!("unsupported scheme {:?}", parsed.scheme()),
        ));
    }

    let name = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        return Err(FetchError::invalid_url(url, "URL path has no file name"));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_query_and_fragment() {
        assert_eq!(
            file_name_from_url("http://example.com/a/b/c.png?x=1&y=2#frag").unwrap(),
            "c.png"
        );
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(file_name_from_url("  http://example.com/x.jpg \n").unwrap(), "x.jpg");
    }

    #[test]
    fn test_name_without_extension() {
        assert_eq!(file_name_from_url("https://example.com/images/12345").unwrap(), "12345");
    }

    #[test]
    fn test_rejects_empty_names() {
        for url in [
            "http://example.com",
            "http://example.com/",
            "http://example.com/dir/",
            "http://example.com/?file=a.jpg",
        ] {
            assert!(
                matches!(file_name_from_url(url), Err(FetchError::InvalidUrl { .. })),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_malformed_and_foreign_schemes() {
        for url in ["", "not a url", "example.com/a.jpg", "ftp://example.com/a.jpg", "file:///tmp/a.jpg"] {
            assert!(
                matches!(file_name_from_url(url), Err(FetchError::InvalidUrl { .. })),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_dot_segments_are_normalized() {
        assert_eq!(file_name_from_url("http://example.com/a/../b.jpg").unwrap(), "b.jpg");
        assert!(file_name_from_url("http://example.com/a/..").is_err());
    }
}
