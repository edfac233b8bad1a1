//! Parser for the indentation-delimited prompt file:
//!
//! ```text
//! keyName:
//!   line one of value
//!   line two of value
//! otherKey:
//!   more text
//! ```
//!
//! A top-level `identifier:` line opens a block; every following line up to
//! the next top-level key (or end of input) belongs to it, with one two-space
//! indent stripped. Leading and trailing blank lines are trimmed. There is no
//! escaping, no comments and no nesting.

use crate::error::{ErrorCode, PatchError, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

const INDENT: &str = "  ";

fn key_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<key>[A-Za-z_]+):\s*$").expect("key-line pattern is valid"))
}

/// Immutable key → block text mapping produced by [`BlockParser::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockMapping {
    entries: BTreeMap<String, String>,
}

impl BlockMapping {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for BlockMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

#[derive(Default)]
pub struct BlockParser;

impl BlockParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `bytes` as UTF-8 and parses it. Decoding is the only failure.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<BlockMapping> {
        let text = std::str::from_utf8(bytes).map_err(|e| PatchError::Parse {
            code: ErrorCode::ParseFailed,
            message: format!("Prompt file is not valid UTF-8: {}", e),
            context: format!("byte offset {}", e.valid_up_to()),
        })?;
        Ok(self.parse(text))
    }

    /// Best-effort parse. Inconsistent indentation is kept verbatim; a
    /// repeated key replaces the earlier block.
    pub fn parse(&self, input: &str) -> BlockMapping {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut entries = BTreeMap::new();
        let mut current: Option<(String, Vec<&str>)> = None;

        for line in input.lines() {
            if let Some(caps) = key_line().captures(line) {
                if let Some((key, body)) = current.take() {
                    entries.insert(key, finish_block(&body));
                }
                current = Some((caps["key"].to_string(), Vec::new()));
                continue;
            }

            // Text before the first key has no owner.
            if let Some((_, body)) = current.as_mut() {
                body.push(line.strip_prefix(INDENT).unwrap_or(line));
            }
        }

        if let Some((key, body)) = current {
            entries.insert(key, finish_block(&body));
        }

        BlockMapping { entries }
    }
}

fn finish_block(lines: &[&str]) -> String {
    let is_blank = |l: &&str| l.trim().is_empty();
    let start = lines.iter().position(|l| !is_blank(l)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !is_blank(l)).map_or(start, |i| i + 1);
    lines[start..end].join("\n")
}
