//! # Delimiter Escaping & Field Tokenizer
//!
//! Records are joined with the two-character delimiter `::`. Any text that
//! lands in a field (activity, text values, JSON string leaves and keys,
//! version) is escaped first so that the only bare `::` sequences left in an
//! encoded record are field boundaries.
//!
//! ## Escape Tokens
//!
//! | Literal | Token | Note |
//! |---------|-------|------|
//! | `\`     | `\\`  | keeps the escape character itself reversible |
//! | `::`    | `\:`  | pairs are taken left to right, non-overlapping |
//! | `:` at end of text | `\;` | a field never ends with a bare colon |
//!
//! ## Tokenizer
//!
//! [`split_fields`] scans left to right and treats every `\x` pair as one
//! atomic unit, so an escaped delimiter can never be mistaken for a real one.
//! An unescaped `::` ends a field. Because escaped fields never end with a
//! bare colon, a run of three colons `:::` always means "delimiter, then a
//! field starting with `:`": the first two colons are the boundary.

/// The field delimiter.
pub const DELIMITER: &str = "::";

const ESCAPE: char = '\\';

/// Escape a text fragment for placement inside a field.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => out.push_str("\\\\"),
            ':' => match chars.peek() {
                Some(':') => {
                    chars.next();
                    out.push_str("\\:");
                }
                None => out.push_str("\\;"),
                Some(_) => out.push(':'),
            },
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`]. Unknown escape pairs and a lone trailing backslash
/// are kept literally.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != ESCAPE {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(ESCAPE) => out.push(ESCAPE),
            Some(':') => out.push_str(DELIMITER),
            Some(';') => out.push(':'),
            Some(other) => {
                out.push(ESCAPE);
                out.push(other);
            }
            None => out.push(ESCAPE),
        }
    }
    out
}

/// Split an encoded record into its raw (still escaped) fields.
///
/// Always returns at least one field. Empty fields are preserved so that
/// positions never shift.
pub fn split_fields(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut fields = Vec::with_capacity(5);
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b':' if bytes.get(i + 1) == Some(&b':') => {
                fields.push(&text[start..i]);
                i += 2;
                start = i;
            }
            _ => i += 1,
        }
    }
    fields.push(&text[start..]);
    fields
}

/// Join already-escaped fields with the delimiter, dropping trailing empty
/// fields. Interior empty fields are kept.
pub fn join_fields<S: AsRef<str>>(fields: &[S]) -> String {
    let keep = fields
        .iter()
        .rposition(|f| !f.as_ref().is_empty())
        .map_or(0, |last| last + 1);
    fields[..keep]
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(DELIMITER)
}
