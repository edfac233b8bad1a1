//! Builds the injected re-assignment line and splices it into a file.
//!
//! The injection relies on the target format letting a later assignment
//! override the original binding for reads that happen after both. That is
//! a precondition on the target files and is not checked here.

/// Trailing comment that marks a line as machine-injected.
pub const INJECTION_MARKER: &str = "// Injected by patcher.py";
const LITERAL_DELIMITER: char = '`';

/// Splits `content` into lines that keep their terminators, so joining the
/// result reproduces `content` exactly.
pub fn split_lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

/// Doubles backslashes and escapes the literal delimiter. Newlines and every
/// other character are left as they are.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            LITERAL_DELIMITER => {
                out.push('\\');
                out.push(LITERAL_DELIMITER);
            }
            other => out.push(other),
        }
    }
    out
}

/// `<name> = `<escaped value>`; // Injected by patcher.py`, without a line terminator.
pub fn injection_line(name: &str, value: &str) -> String {
    format!(
        "{name} = {d}{body}{d}; {INJECTION_MARKER}",
        d = LITERAL_DELIMITER,
        body = escape_literal(value)
    )
}

/// Returns `lines` with the injection inserted directly after `end_line`.
/// The original lines are never altered, except that an unterminated final
/// line gains a terminator so the injection starts on a line of its own.
///
/// # Panics
///
/// Panics if `end_line` is out of bounds.
pub fn insert(lines: &[&str], end_line: usize, name: &str, value: &str) -> Vec<String> {
    assert!(end_line < lines.len(), "end_line must index an existing line");

    let anchor = lines[end_line];
    let anchor_eol = line_ending(anchor);
    let eol = anchor_eol.unwrap_or_else(|| dominant_line_ending(lines));

    let mut injected = injection_line(name, value);
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 1);
    out.extend(lines[..end_line].iter().map(|l| l.to_string()));

    match anchor_eol {
        Some(_) => {
            out.push(anchor.to_string());
            injected.push_str(eol);
        }
        // The anchor was the unterminated last line; keep the file's
        // no-trailing-newline shape by leaving the injection bare.
        None => out.push(format!("{anchor}{eol}")),
    }

    out.push(injected);
    out.extend(lines[end_line + 1..].iter().map(|l| l.to_string()));
    out
}

fn line_ending(line: &str) -> Option<&'static str> {
    if line.ends_with("\r\n") {
        Some("\r\n")
    } else if line.ends_with('\n') {
        Some("\n")
    } else {
        None
    }
}

fn dominant_line_ending(lines: &[&str]) -> &'static str {
    let crlf = lines.iter().filter(|l| l.ends_with("\r\n")).count();
    let lf = lines.iter().filter(|l| l.ends_with('\n')).count() - crlf;
    if crlf > lf { "\r\n" } else { "\n" }
}
