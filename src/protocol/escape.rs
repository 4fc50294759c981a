//! Wire codec
//!
//! Escaping and unescaping of protocol-reserved characters.
//!
//! ## Escape Table
//!
//! ```text
//! \   ->  \\        BEL (0x07)  ->  \a
//! /   ->  \/        BS  (0x08)  ->  \b
//! SP  ->  \s        FF  (0x0C)  ->  \f
//! |   ->  \p        LF          ->  \n
//! ;   ->  \;        CR          ->  \r
//!                   TAB         ->  \t
//!                   VT  (0x0B)  ->  \v
//! ```
//!
//! The backslash is handled first on encode so already-escaped sequences are
//! never double-escaped, and `unescape` maps each two-character sequence back
//! in a single pass.

/// Escape a value for transmission
///
/// Every reserved character becomes a two-character backslash sequence.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            ' ' => out.push_str("\\s"),
            '|' => out.push_str("\\p"),
            ';' => out.push_str("\\;"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x0C' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x0B' => out.push_str("\\v"),
            _ => out.push(ch),
        }
    }

    out
}

/// Reverse the escape mapping in a single pass
///
/// Each known two-character sequence maps back to one literal character.
/// Unrecognized sequences (and a trailing lone backslash) pass through
/// untouched, so the function never double-unescapes.
pub fn unescape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('s') => out.push(' '),
            Some('p') => out.push('|'),
            Some(';') => out.push(';'),
            Some('a') => out.push('\x07'),
            Some('b') => out.push('\x08'),
            Some('f') => out.push('\x0C'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\x0B'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Returns true if the string is an integral numeric value
///
/// Drives the row model's auto-coercion: values with a decimal point (or
/// anything else `i64` cannot represent) stay strings.
pub fn is_integer(input: &str) -> bool {
    input.parse::<i64>().is_ok()
}
