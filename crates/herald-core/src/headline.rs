//! Headline prompt construction and response post-processing.

use crate::error::AppError;

/// Default upper bound on headline length, in words.
pub const DEFAULT_WORD_BUDGET: usize = 14;

/// Bodies are cut to this many characters before being sent for enrichment.
pub const DEFAULT_MAX_BODY_CHARS: usize = 12_000;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert researcher, use your knowledge about the world to accurately and precisely distill the article below. Your goal is to ensure the reader knows exactly what the article is about by its new headline";

/// The instruction pair sent to the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlinePrompt {
    pub word_budget: usize,
    pub max_body_chars: usize,
}

impl Default for HeadlinePrompt {
    fn default() -> Self {
        Self {
            word_budget: DEFAULT_WORD_BUDGET,
            max_body_chars: DEFAULT_MAX_BODY_CHARS,
        }
    }
}

impl HeadlinePrompt {
    pub fn new(word_budget: usize) -> Self {
        Self {
            word_budget,
            ..Self::default()
        }
    }

    pub fn with_max_body_chars(mut self, max_body_chars: usize) -> Self {
        self.max_body_chars = max_body_chars;
        self
    }

    pub fn system(&self) -> &'static str {
        SYSTEM_INSTRUCTION
    }

    /// User message carrying the word budget and the (truncated) body.
    pub fn user(&self, body: &str) -> String {
        format!(
            "Create a new headline for the article below. Use less than {} words.\n\narticle: {}",
            self.word_budget,
            truncate_chars(body, self.max_body_chars)
        )
    }
}

/// Cut `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Remove one pair of enclosing double quotes, if the same pair wraps both ends.
/// Single quotes stay: a leading apostrophe and a trailing possessive look alike.
pub fn strip_enclosing_quotes(text: &str) -> &str {
    const PAIRS: &[(char, char)] = &[('"', '"'), ('\u{201C}', '\u{201D}')];

    for &(open, close) in PAIRS {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    text
}

/// Turn a raw completion into a stored headline.
///
/// An absent or blank completion is an [`AppError::EnrichmentError`].
pub fn parse_headline(raw: Option<&str>) -> Result<String, AppError> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    let headline = strip_enclosing_quotes(trimmed).trim();
    if headline.is_empty() {
        return Err(AppError::EnrichmentError(
            "Empty response from text generation".into(),
        ));
    }
    Ok(headline.to_string())
}
