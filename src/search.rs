//! Case-insensitive substring search over section titles and content.
//!
//! There is no index: every query scans the given sections in order. Results
//! whose title matches come first; within each group the input order is kept.

use serde::Serialize;

use crate::formats::Section;

/// A contiguous piece of highlighted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Fragment<'t> {
    Text(&'t str),
    Match(&'t str),
}

/// Sections whose title or content contains `query`, title matches first.
///
/// An empty or whitespace-only query yields no results.
pub fn search<'a, I>(sections: I, query: &str) -> Vec<&'a Section>
where
    I: IntoIterator<Item = &'a Section>,
{
    if query.trim().is_empty() {
        return Vec::new();
    }

    let needle = fold(query);
    let mut title_matches = Vec::new();
    let mut content_matches = Vec::new();
    for section in sections {
        if contains_folded(&section.title, &needle) {
            title_matches.push(section);
        } else if section
            .content
            .as_deref()
            .is_some_and(|content| contains_folded(content, &needle))
        {
            content_matches.push(section);
        }
    }

    tracing::debug!(
        query,
        title_matches = title_matches.len(),
        content_matches = content_matches.len(),
        "search"
    );
    title_matches.extend(content_matches);
    title_matches
}

/// Splits `text` around every case-insensitive occurrence of `query`.
///
/// Matching is literal and non-overlapping, scanning left to right. An empty
/// query marks nothing.
pub fn highlight<'t>(text: &'t str, query: &str) -> Vec<Fragment<'t>> {
    let needle = fold(query);
    if needle.is_empty() {
        return if text.is_empty() {
            Vec::new()
        } else {
            vec![Fragment::Text(text)]
        };
    }

    let mut fragments = Vec::new();
    let mut plain_start = 0;
    let mut cursor = 0;
    while cursor < text.len() {
        if let Some(len) = match_len(&text[cursor..], &needle) {
            if plain_start < cursor {
                fragments.push(Fragment::Text(&text[plain_start..cursor]));
            }
            fragments.push(Fragment::Match(&text[cursor..cursor + len]));
            cursor += len;
            plain_start = cursor;
        } else {
            cursor += text[cursor..].chars().next().map_or(1, char::len_utf8);
        }
    }
    if plain_start < text.len() {
        fragments.push(Fragment::Text(&text[plain_start..]));
    }
    fragments
}

/// Renders `text` with each match wrapped in `open`/`close`.
pub fn mark(text: &str, query: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for fragment in highlight(text, query) {
        match fragment {
            Fragment::Text(text) => out.push_str(text),
            Fragment::Match(text) => {
                out.push_str(open);
                out.push_str(text);
                out.push_str(close);
            }
        }
    }
    out
}

fn fold(text: &str) -> Vec<char> {
    text.chars().flat_map(char::to_lowercase).collect()
}

fn contains_folded(haystack: &str, needle: &[char]) -> bool {
    haystack
        .char_indices()
        .any(|(start, _)| match_len(&haystack[start..], needle).is_some())
}

// Byte length of the prefix of `haystack` that folds to exactly `needle`.
fn match_len(haystack: &str, needle: &[char]) -> Option<usize> {
    let mut matched = 0;
    for (idx, ch) in haystack.char_indices() {
        for lower in ch.to_lowercase() {
            if needle.get(matched) != Some(&lower) {
                return None;
            }
            matched += 1;
        }
        if matched == needle.len() {
            return Some(idx + ch.len_utf8());
        }
    }
    None
}
