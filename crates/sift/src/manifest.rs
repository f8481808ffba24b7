//! Manifest reading.
//!
//! A manifest is a comma-separated text file whose header row names a `url`
//! column. Fields are split on commas and stripped of surrounding double
//! quotes; quoted commas are not supported.

use std::io::BufRead;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use sift_fetch::FetchError;
use sift_pipeline::CandidateResource;

/// URL predicate applied while reading a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Substrings the URL must all contain.
    pub contains: Vec<String>,

    /// Accepted file extensions, with or without the leading dot. Empty
    /// accepts every extension.
    pub extensions: Vec<String>,
}

impl Filter {
    pub fn is_empty(&self) -> bool { self.contains.is_empty() && self.extensions.is_empty() }

    pub fn accepts(&self, candidate: &CandidateResource) -> bool {
        if !self.contains.iter().all(|s| candidate.url.contains(s.as_str())) {
            return false;
        }
        if self.extensions.is_empty() {
            return true;
        }

        let name = candidate.suggested_name.to_ascii_lowercase();
        self.extensions.iter().any(|ext| {
            let ext = ext.trim_start_matches('.').to_ascii_lowercase();
            name.strip_suffix(ext.as_str()).is_some_and(|stem| stem.ends_with('.'))
        })
    }
}

/// One data row of a manifest.
#[derive(Debug)]
pub enum Entry {
    Candidate(CandidateResource),

    /// Row left out on purpose.
    Skipped { line: usize, url: String, reason: String },

    /// Row whose URL cannot be fetched.
    Invalid { line: usize, url: String, error: FetchError },
}

/// Read all rows of a manifest.
///
/// Fails only when the input cannot be read or has no `url` column; bad
/// rows come back as [`Entry::Skipped`] or [`Entry::Invalid`].
pub fn read(reader: impl BufRead, filter: &Filter) -> anyhow::Result<Vec<Entry>> {
    let mut lines = reader.lines().enumerate();

    let column = loop {
        let Some((_, line)) = lines.next() else {
            bail!("manifest is empty");
        };
        let line = line.context("failed to read manifest header")?;
        if line.trim().is_empty() {
            continue;
        }
        break fields(&line)
            .position(|f| f.eq_ignore_ascii_case("url"))
            .context("manifest header has no `url` column")?;
    };

    let mut entries = Vec::new();
    for (index, line) in lines {
        let line_no = index + 1;
        let line = line.with_context(|| format!("failed to read manifest line {line_no}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let url = fields(&line).nth(column).unwrap_or_default().to_string();
        entries.push(entry(line_no, url, filter));
    }
    Ok(entries)
}

fn entry(line: usize, url: String, filter: &Filter) -> Entry {
    if url.is_empty() {
        return Entry::Skipped {
            line,
            url,
            reason: "blank url".into(),
        };
    }

    match CandidateResource::from_url(url.as_str()) {
        Ok(candidate) if filter.accepts(&candidate) => Entry::Candidate(candidate),
        Ok(_) => Entry::Skipped {
            line,
            url,
            reason: "filtered out".into(),
        },
        Err(error) => Entry::Invalid { line, url, error },
    }
}

fn fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(',').map(|f| f.trim().trim_matches('"').trim())
}
