//! Extraction of the trigger fragment under the cursor.

use std::ops::Range;

use crate::error::{Error, Result};

/// A cursor reported one position past the end of the input is treated as the end.
pub const CURSOR_END_ALLOWANCE: usize = 1;

/// Path components of a completion fragment.
///
/// The last component is the *active* one being typed; any earlier ones are
/// *anchors* that must match ancestor segments. An empty active component
/// (fragment ending in `/`) asks for the contents of the anchored directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    components: Vec<String>,
    rooted: bool,
}

impl Query {
    /// Split a fragment (the text after the trigger) into components.
    ///
    /// A leading `/` or `./` anchors the query at the workspace root, as does an
    /// empty fragment. Interior empty components are collapsed.
    pub fn from_fragment(fragment: &str) -> Self {
        let (mut rooted, rest) = if let Some(rest) = fragment.strip_prefix("./") {
            (true, rest)
        } else if let Some(rest) = fragment.strip_prefix('/') {
            (true, rest)
        } else {
            (false, fragment)
        };

        let mut components: Vec<String> = rest
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        if components.is_empty() || rest.ends_with('/') {
            components.push(String::new());
        }
        if components.len() == 1 && components[0].is_empty() {
            rooted = true;
        }

        Self { components, rooted }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The component under the cursor.
    pub fn active(&self) -> &str {
        self.components.last().map_or("", String::as_str)
    }

    pub fn anchors(&self) -> &[String] {
        &self.components[..self.components.len().saturating_sub(1)]
    }

    /// Whether anchors must start at the workspace root.
    pub const fn is_rooted(&self) -> bool {
        self.rooted
    }

    /// True for a trailing-slash (or bare trigger) directory listing.
    pub fn is_listing(&self) -> bool {
        self.active().is_empty()
    }

    /// Components joined back with `/`, without any root marker.
    pub fn joined(&self) -> String {
        self.components.join("/")
    }
}

/// A query found under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub query: Query,
    /// Raw text between the trigger and the cursor.
    pub fragment: String,
    /// Byte range from the trigger to the end of the token under the cursor;
    /// the text a selected completion replaces.
    pub replace: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Found(ParsedQuery),
    NoTrigger,
}

/// Parse `text` with the cursor at character offset `cursor`.
pub fn parse(text: &str, cursor: usize, trigger: char) -> Result<Parsed> {
    let byte = cursor_byte_offset(text, cursor)?;
    Ok(parse_at_byte(text, byte, trigger))
}

/// Convert a character offset to a byte offset, rejecting positions past the
/// end (beyond [`CURSOR_END_ALLOWANCE`]).
pub fn cursor_byte_offset(text: &str, cursor: usize) -> Result<usize> {
    let len = text.chars().count();
    if cursor > len.saturating_add(CURSOR_END_ALLOWANCE) {
        return Err(Error::invalid_input(format!(
            "cursor position {cursor} is outside the input (length {len})"
        )));
    }
    Ok(text
        .char_indices()
        .nth(cursor)
        .map_or(text.len(), |(idx, _)| idx))
}

/// Parse with the cursor already converted to a byte offset on a char boundary.
pub fn parse_at_byte(text: &str, cursor: usize, trigger: char) -> Parsed {
    let before = &text[..cursor];
    let token_start = before
        .char_indices()
        .rev()
        .find(|(_, ch)| ch.is_whitespace())
        .map_or(0, |(idx, ch)| idx + ch.len_utf8());
    let token = &before[token_start..];

    // Only the nearest trigger counts; an escaped one ends the search.
    let Some(offset) = token.rfind(trigger) else {
        return Parsed::NoTrigger;
    };
    if token[..offset].ends_with('\\') {
        return Parsed::NoTrigger;
    }

    let trigger_at = token_start + offset;
    let fragment_start = trigger_at + trigger.len_utf8();
    let token_end = text[cursor..]
        .find(char::is_whitespace)
        .map_or(text.len(), |idx| cursor + idx);
    let fragment = &text[fragment_start..cursor];

    Parsed::Found(ParsedQuery {
        query: Query::from_fragment(fragment),
        fragment: fragment.to_string(),
        replace: trigger_at..token_end,
    })
}
