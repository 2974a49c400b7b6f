use herald_core::error::AppError;
use herald_core::traits::Cleaner;
use scraper::{Html, Node};

/// Characters that attach to the preceding word instead of starting a new one.
const CLOSING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', ')', ']', '}', '\u{2026}', '\u{201D}', '\u{2019}',
];

const OPENING_PUNCTUATION: &[char] = &['(', '[', '{', '\u{201C}'];

/// Elements whose text is never shown to a reader.
const HIDDEN_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "svg", "iframe", "object",
];

/// Visible-text extractor built on `scraper`.
///
/// Collects every text node outside [`HIDDEN_TAGS`] and joins them with a
/// space, except inside brackets and before closing punctuation. Layout is
/// not preserved; body normalization flattens it anyway.
#[derive(Debug, Clone, Default)]
pub struct TextCleaner;

impl TextCleaner {
    pub fn new() -> Self {
        Self
    }
}

impl Cleaner for TextCleaner {
    fn clean(&self, html: &str) -> Result<String, AppError> {
        let document = Html::parse_document(html);

        let parts: Vec<&str> = document
            .tree
            .nodes()
            .filter_map(|node| match node.value() {
                Node::Text(text) => Some((node, &**text)),
                _ => None,
            })
            .filter(|(node, _)| {
                !node.ancestors().any(|a| {
                    matches!(a.value(), Node::Element(el) if HIDDEN_TAGS.contains(&el.name()))
                })
            })
            .map(|(_, text)| text.trim())
            .filter(|text| !text.is_empty())
            .collect();

        Ok(join_parts(&parts))
    }
}

fn join_parts(parts: &[&str]) -> String {
    let mut out = String::with_capacity(parts.iter().map(|p| p.len() + 1).sum());
    for part in parts {
        if !out.is_empty()
            && !out.ends_with(OPENING_PUNCTUATION)
            && !part.starts_with(CLOSING_PUNCTUATION)
        {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}
