//! Article body retrieval and validation.
//!
//! A body is usable only once it has been fetched, reduced to visible text,
//! normalized to a single line and found to be at least
//! [`DEFAULT_MIN_BODY_CHARS`] characters long. Anything shorter usually means
//! a paywall, a redirect stub or an extraction miss.

use thiserror::Error;

use crate::traits::{BodyFetcher, Cleaner, Fetcher};

/// Bodies with fewer characters than this are rejected.
pub const DEFAULT_MIN_BODY_CHARS: usize = 1000;

/// Why a candidate's body was not usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    /// Extracted text is below the minimum length.
    #[error("body too short ({len} < {min} chars)")]
    TooShort { len: usize, min: usize },

    /// The page could not be retrieved or its text could not be extracted.
    #[error("fetch failed: {0}")]
    FetchFailed(String),
}

/// Collapse extracted text into a single clean line.
///
/// Line breaks and whitespace runs become one space, and U+FFFD replacement
/// characters (left behind by lossy decoding) and other control characters
/// are dropped.
pub fn normalize_body(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c == '\u{FFFD}' {
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if c.is_control() {
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);
    }

    out
}

/// Check the minimum-length rule, counting characters rather than bytes.
pub fn validate_body(body: String, min_chars: usize) -> Result<String, Rejected> {
    let len = body.chars().count();
    if len < min_chars {
        return Err(Rejected::TooShort {
            len,
            min: min_chars,
        });
    }
    Ok(body)
}

/// [`BodyFetcher`] built from a page [`Fetcher`] and a text [`Cleaner`].
#[derive(Clone)]
pub struct PageBodyFetcher<F, C>
where
    F: Fetcher,
    C: Cleaner,
{
    fetcher: F,
    cleaner: C,
    min_chars: usize,
}

impl<F, C> PageBodyFetcher<F, C>
where
    F: Fetcher,
    C: Cleaner,
{
    pub fn new(fetcher: F, cleaner: C) -> Self {
        Self {
            fetcher,
            cleaner,
            min_chars: DEFAULT_MIN_BODY_CHARS,
        }
    }

    pub fn with_min_chars(mut self, min_chars: usize) -> Self {
        self.min_chars = min_chars;
        self
    }
}

impl<F, C> BodyFetcher for PageBodyFetcher<F, C>
where
    F: Fetcher,
    C: Cleaner,
{
    async fn fetch_body(&self, url: &str) -> Result<String, Rejected> {
        let html = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| Rejected::FetchFailed(e.to_string()))?;

        let text = self
            .cleaner
            .clean(&html)
            .map_err(|e| Rejected::FetchFailed(e.to_string()))?;

        validate_body(normalize_body(&text), self.min_chars)
    }
}
