//! Front-matter parser for content artifacts.
//!
//! ```text
//! ---
//! title: "Hello"
//! keywords: rust, blogging
//! ---
//! Body text...
//! ```
//!
//! Parsing never fails. Input without a leading `---` line has no metadata.
//! Input with an opening delimiter but no closing one, or with a header line
//! that is not `key: value`, is malformed: the whole text becomes the body
//! and [`ParsedContent::warning`] explains why.

use std::collections::BTreeMap;

const DELIMITER: &str = "---";

/// A content artifact split into metadata and body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedContent {
    /// Header fields; unknown keys are kept.
    pub metadata: BTreeMap<String, String>,
    /// Text after the header.
    pub body: String,
    /// Set when the header was malformed and ignored.
    pub warning: Option<String>,
}

impl ParsedContent {
    /// Returns a metadata value, ignoring empty ones.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    fn whole_body(text: &str, warning: Option<String>) -> Self {
        Self {
            metadata: BTreeMap::new(),
            body: text.to_string(),
            warning,
        }
    }
}

/// Splits `text` into front-matter metadata and body.
#[must_use]
pub fn parse(text: &str) -> ParsedContent {
    let mut lines = text.split_inclusive('\n');

    match lines.next() {
        Some(first) if first.trim() == DELIMITER => {}
        _ => return ParsedContent::whole_body(text, None),
    }

    let mut metadata = BTreeMap::new();
    let mut consumed = text.split_inclusive('\n').next().map_or(0, str::len);

    for line in lines {
        consumed += line.len();
        let trimmed = line.trim();

        if trimmed == DELIMITER {
            let body = text[consumed..].trim_start_matches(['\r', '\n']).to_string();
            return ParsedContent {
                metadata,
                body,
                warning: None,
            };
        }
        if trimmed.is_empty() {
            continue;
        }

        match trimmed.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                metadata.insert(key.trim().to_string(), unquote(value.trim()).to_string());
            }
            _ => {
                return ParsedContent::whole_body(
                    text,
                    Some(format!("front-matter line is not 'key: value': {trimmed:?}")),
                );
            }
        }
    }

    ParsedContent::whole_body(text, Some("front-matter has no closing '---' line".to_string()))
}

/// Strips one matching pair of surrounding quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Splits a comma-separated keyword field into trimmed, non-empty tags.
#[must_use]
pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
        .collect()
}
