//! Calls from the host into the page's script entry points.
//!
//! The host drives the page by loading `javascript:` URLs. String arguments
//! are embedded as double-quoted ECMAScript literals.

use std::fmt::Write;

/// A call into one of the page's exported entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// Ask the page to report the container's inner markup.
    GetContent,
    /// Replace the user's selection with an HTML fragment.
    InsertContent(String),
    /// Collapse the caret at the start of the element with this id.
    SetCaretToElement(String),
}

impl HostCall {
    /// Name of the page function this call invokes.
    pub fn function_name(&self) -> &'static str {
        match self {
            HostCall::GetContent => "getContent",
            HostCall::InsertContent(_) => "insertContentAtUserSelection",
            HostCall::SetCaretToElement(_) => "setTheCursorPositionAtTheGivenElementId",
        }
    }

    /// The `javascript:` URL that performs this call.
    pub fn to_url(&self) -> String {
        match self {
            HostCall::GetContent => format!("javascript:{}();", self.function_name()),
            HostCall::InsertContent(arg) | HostCall::SetCaretToElement(arg) => format!(
                "javascript:{}(\"{}\");",
                self.function_name(),
                escape_ecmascript(arg)
            ),
        }
    }
}

/// Escape a string for use inside an ECMAScript string literal.
///
/// Quotes, backslash and `/` get a backslash; `\b \n \t \f \r` use their
/// short forms; every other character outside printable ASCII becomes one or
/// two `\uXXXX` UTF-16 escapes.
pub fn escape_ecmascript(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    for c in input.chars() {
        match c {
            '\'' | '"' | '\\' | '/' => {
                out.push('\\');
                out.push(c);
            }
            '\u{08}' => out.push_str("\\b"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\u{0C}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7f => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // Writing to a String cannot fail.
                    let _ = write!(out, "\\u{:04X}", unit);
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_ascii_unchanged() {
        assert_eq!(escape_ecmascript("hello world 123"), "hello world 123");
        assert_eq!(escape_ecmascript(""), "");
    }

    #[test]
    fn test_escape_quotes_and_slashes() {
        insta::assert_snapshot!(
            escape_ecmascript(r#"<a href="x">it's</a>\"#),
            @r#"<a href=\"x\">it\'s<\/a>\\"#
        );
    }

    #[test]
    fn test_escape_control_characters() {
        assert_eq!(escape_ecmascript("a\nb\tc\r\u{8}\u{c}"), "a\\nb\\tc\\r\\b\\f");
        assert_eq!(escape_ecmascript("\u{0}\u{1f}"), "\\u0000\\u001F");
        // DEL is left alone.
        assert_eq!(escape_ecmascript("\u{7f}"), "\u{7f}");
    }

    #[test]
    fn test_escape_non_ascii_as_utf16() {
        assert_eq!(escape_ecmascript("é"), "\\u00E9");
        assert_eq!(escape_ecmascript("日本"), "\\u65E5\\u672C");
        assert_eq!(escape_ecmascript("😀"), "\\uD83D\\uDE00");
    }

    #[test]
    fn test_call_urls() {
        assert_eq!(HostCall::GetContent.to_url(), "javascript:getContent();");
        assert_eq!(
            HostCall::InsertContent("<b>hi</b>".into()).to_url(),
            "javascript:insertContentAtUserSelection(\"<b>hi<\\/b>\");"
        );
        assert_eq!(
            HostCall::SetCaretToElement("para-\"1\"".into()).to_url(),
            "javascript:setTheCursorPositionAtTheGivenElementId(\"para-\\\"1\\\"\");"
        );
    }
}
