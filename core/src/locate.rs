//! Finds a variable's declaration and the line that ends its statement.
//!
//! Matching is a plain line scan: it knows nothing about scopes, strings or
//! comments. A declaration-shaped line inside a string literal, or a `;`
//! inside a literal value, will be taken at face value.

use regex::Regex;
use std::fmt;

/// Keywords that open a top-level binding in the target files.
pub const BINDING_KEYWORDS: [&str; 2] = ["const", "let"];
pub const STATEMENT_TERMINATOR: char = ';';

/// Line span of a located declaration statement (both indices inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statement {
    pub decl_line: usize,
    pub end_line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    Declaration,
    Unterminated,
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::Declaration => write!(f, "declaration not found"),
            NotFound::Unterminated => write!(f, "statement has no terminator before end of file"),
        }
    }
}

pub trait StatementLocator {
    /// Index of the first line declaring `name`.
    fn locate_declaration(&self, lines: &[&str], name: &str) -> Option<usize>;

    /// Index of the first line at or after `from` that ends a statement.
    fn locate_statement_end(&self, lines: &[&str], from: usize) -> Option<usize>;

    fn locate(&self, lines: &[&str], name: &str) -> Result<Statement, NotFound> {
        let decl_line = self
            .locate_declaration(lines, name)
            .ok_or(NotFound::Declaration)?;
        let end_line = self
            .locate_statement_end(lines, decl_line)
            .ok_or(NotFound::Unterminated)?;
        Ok(Statement { decl_line, end_line })
    }
}

/// Regex line scanner. First match wins in both directions.
#[derive(Debug, Default, Clone, Copy)]
pub struct LineScanLocator;

impl LineScanLocator {
    pub fn new() -> Self {
        Self
    }

    fn declaration_pattern(name: &str) -> Option<Regex> {
        let pattern = format!(
            r"(?:{})\s+{}\s*=",
            BINDING_KEYWORDS.join("|"),
            regex::escape(name)
        );
        // Only a pathological name can exceed the regex size limit; such a
        // name cannot be declared either.
        Regex::new(&pattern).ok()
    }
}

impl StatementLocator for LineScanLocator {
    fn locate_declaration(&self, lines: &[&str], name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        let re = Self::declaration_pattern(name)?;
        lines.iter().position(|line| re.is_match(line))
    }

    fn locate_statement_end(&self, lines: &[&str], from: usize) -> Option<usize> {
        lines
            .iter()
            .enumerate()
            .skip(from)
            .find(|(_, line)| line.contains(STATEMENT_TERMINATOR))
            .map(|(i, _)| i)
    }
}
