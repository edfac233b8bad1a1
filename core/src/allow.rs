use crate::error::{ErrorCode, PatchError, Result};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Identifiers patchable when no allow-list is supplied.
pub const DEFAULT_ALLOWED: [&str; 2] = ["SUMMARIZE_TOOL_OUTPUT_PROMPT", "EDIT_SYS_PROMPT"];

fn identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"))
}

/// Set of top-level identifiers a manifest entry may target. Only top-level
/// bindings can be overridden by a trailing re-assignment, so anything outside
/// this set is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    names: BTreeSet<String>,
}

impl AllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { names: names.into_iter().map(Into::into).collect() }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.names.is_empty() {
            return Err(PatchError::Validation {
                code: ErrorCode::ValidationFailed,
                message: "Allow-list is empty; nothing could ever be patched".to_string(),
                context: "allow_list".to_string(),
            });
        }
        if let Some(bad) = self.names.iter().find(|n| !identifier().is_match(n)) {
            return Err(PatchError::Validation {
                code: ErrorCode::ValidationFailed,
                message: "Allow-list entry is not an identifier".to_string(),
                context: bad.clone(),
            });
        }
        Ok(())
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED)
    }
}
