//! Minimal HTML fragment parsing and `innerHTML`-style serialization.
//!
//! Enough HTML for editor fragments, not a conforming parser:
//! - Tag and attribute names are ASCII `[A-Za-z0-9:_-]`, lowercased.
//! - Void elements never take children; `<x/>` closes any element.
//! - End tags close the nearest open element with that name and are ignored
//!   when nothing matches. Elements left open at the end are closed.
//! - Comments, doctypes and processing instructions are dropped.
//! - Entities: `&amp; &lt; &gt; &quot; &apos; &nbsp;` plus numeric
//!   references terminated by `;`. Anything else stays as written.

use memchr::memchr;
use smol_str::SmolStr;

use super::tree::{NodeId, NodeKind, Tree};

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[derive(Debug, PartialEq)]
enum Token {
    Text(String),
    StartTag {
        name: SmolStr,
        attrs: Vec<(SmolStr, String)>,
        self_closing: bool,
    },
    EndTag(SmolStr),
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b':' | b'_' | b'-')
}

fn tokenize(input: &str) -> Vec<Token> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    // Slices are only ever cut at ASCII bytes, so they stay on char boundaries.
    while i < bytes.len() {
        let Some(rel) = memchr(b'<', &bytes[i..]) else {
            text.push_str(&input[i..]);
            break;
        };
        text.push_str(&input[i..i + rel]);
        i += rel;

        let rest = &input[i..];
        if rest.starts_with(COMMENT_START) {
            i = match rest[COMMENT_START.len()..].find(COMMENT_END) {
                Some(end) => i + COMMENT_START.len() + end + COMMENT_END.len(),
                None => bytes.len(),
            };
            continue;
        }

        let next = bytes.get(i + 1).copied();
        match next {
            Some(b'!') | Some(b'?') => {
                i = memchr(b'>', &bytes[i..]).map_or(bytes.len(), |p| i + p + 1);
            }
            Some(b'/') if bytes.get(i + 2).is_some_and(|b| b.is_ascii_alphabetic()) => {
                let start = i + 2;
                let mut j = start;
                while j < bytes.len() && is_name_byte(bytes[j]) {
                    j += 1;
                }
                let name = SmolStr::new(input[start..j].to_ascii_lowercase());
                i = memchr(b'>', &bytes[j..]).map_or(bytes.len(), |p| j + p + 1);
                flush_text(&mut text, &mut out);
                out.push(Token::EndTag(name));
            }
            Some(b) if b.is_ascii_alphabetic() => {
                flush_text(&mut text, &mut out);
                let (token, end) = read_start_tag(input, i + 1);
                out.push(token);
                i = end;
            }
            _ => {
                text.push('<');
                i += 1;
            }
        }
    }

    flush_text(&mut text, &mut out);
    out
}

fn flush_text(text: &mut String, out: &mut Vec<Token>) {
    if !text.is_empty() {
        out.push(Token::Text(decode_entities(text)));
        text.clear();
    }
}

/// Read a start tag whose name begins at `start`. Returns the token and the
/// index just past the closing `>`.
fn read_start_tag(input: &str, start: usize) -> (Token, usize) {
    let bytes = input.as_bytes();
    let mut j = start;
    while j < bytes.len() && is_name_byte(bytes[j]) {
        j += 1;
    }
    let name = SmolStr::new(input[start..j].to_ascii_lowercase());
    let mut attrs = Vec::new();
    let mut self_closing = false;

    loop {
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        match bytes.get(j) {
            None => break,
            Some(b'>') => {
                j += 1;
                break;
            }
            Some(b'/') => {
                j += 1;
                if bytes.get(j) == Some(&b'>') {
                    self_closing = true;
                    j += 1;
                    break;
                }
                continue;
            }
            _ => {}
        }

        let name_start = j;
        while j < bytes.len()
            && !bytes[j].is_ascii_whitespace()
            && !matches!(bytes[j], b'=' | b'>' | b'/')
        {
            j += 1;
        }
        let attr_name = SmolStr::new(input[name_start..j].to_ascii_lowercase());

        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let mut value = String::new();
        if bytes.get(j) == Some(&b'=') {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            match bytes.get(j) {
                Some(&quote @ (b'"' | b'\'')) => {
                    let value_start = j + 1;
                    let value_end =
                        memchr(quote, &bytes[value_start..]).map_or(bytes.len(), |p| value_start + p);
                    value = decode_entities(&input[value_start..value_end]);
                    j = (value_end + 1).min(bytes.len());
                }
                _ => {
                    let value_start = j;
                    while j < bytes.len() && !bytes[j].is_ascii_whitespace() && bytes[j] != b'>' {
                        j += 1;
                    }
                    value = decode_entities(&input[value_start..j]);
                }
            }
        }

        if !attr_name.is_empty() && !attrs.iter().any(|(n, _)| *n == attr_name) {
            attrs.push((attr_name, value));
        }
    }

    (
        Token::StartTag {
            name,
            attrs,
            self_closing,
        },
        j,
    )
}

/// Decode the small set of entities editor fragments actually use.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse `html` into detached top-level nodes of `tree`, in document order.
pub fn parse_fragment(tree: &mut Tree, html: &str) -> Vec<NodeId> {
    let mut top = Vec::new();
    let mut open: Vec<NodeId> = Vec::new();

    for token in tokenize(html) {
        match token {
            Token::Text(text) => {
                let node = tree.create_text(text);
                append(tree, &open, &mut top, node);
            }
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => {
                let node = tree.create_element(&name, attrs);
                append(tree, &open, &mut top, node);
                if !self_closing && !is_void_element(&name) {
                    open.push(node);
                }
            }
            Token::EndTag(name) => {
                if let Some(pos) = open.iter().rposition(|&n| tree.tag(n) == Some(&name)) {
                    open.truncate(pos);
                }
            }
        }
    }

    top
}

fn append(tree: &mut Tree, open: &[NodeId], top: &mut Vec<NodeId>, node: NodeId) {
    match open.last() {
        Some(&parent) => tree.append_child(parent, node),
        None => top.push(node),
    }
}

/// Serialized markup of the children of `id`.
pub fn inner_html(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(id) {
        write_node(tree, child, &mut out);
    }
    out
}

fn write_node(tree: &Tree, id: NodeId, out: &mut String) {
    match tree.kind(id) {
        NodeKind::Document => {
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
        }
        NodeKind::Text(text) => escape_text(text, out),
        NodeKind::Element { tag, attrs } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attribute(value, out);
                out.push('"');
            }
            out.push('>');
            if is_void_element(tag) {
                return;
            }
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(html: &str) -> String {
        let mut tree = Tree::new();
        let nodes = parse_fragment(&mut tree, html);
        let holder = tree.create_element("div", vec![]);
        for node in nodes {
            tree.append_child(holder, node);
        }
        inner_html(&tree, holder)
    }

    #[test]
    fn test_parse_nested_elements() {
        let mut tree = Tree::new();
        let nodes = parse_fragment(&mut tree, "<p>a<b>c</b></p>tail");
        assert_eq!(nodes.len(), 2);
        assert_eq!(tree.tag(nodes[0]), Some("p"));
        assert_eq!(tree.children(nodes[0]).len(), 2);
        assert!(tree.is_text(nodes[1]));
    }

    #[test]
    fn test_parse_empty_input() {
        let mut tree = Tree::new();
        assert!(parse_fragment(&mut tree, "").is_empty());
        assert!(parse_fragment(&mut tree, "<!-- only a comment -->").is_empty());
    }

    #[test]
    fn test_void_elements_take_no_children() {
        insta::assert_snapshot!(round_trip("a<br>b<img src=x.png>c"), @r#"a<br>b<img src="x.png">c"#);
    }

    #[test]
    fn test_attributes_normalised() {
        insta::assert_snapshot!(
            round_trip(r#"<A HREF='/x?a=1&amp;b=2' Data-Id=7 hidden>link</A>"#),
            @r#"<a href="/x?a=1&amp;b=2" data-id="7" hidden="">link</a>"#
        );
    }

    #[test]
    fn test_unclosed_and_stray_tags() {
        insta::assert_snapshot!(round_trip("<b>bold<i>both</b>after</i>"), @"<b>bold<i>both</i></b>after");
    }

    #[test]
    fn test_text_entities_round_trip() {
        insta::assert_snapshot!(round_trip("1 &lt; 2 &amp;&amp; 3 &gt; 2&nbsp;ok"), @"1 &lt; 2 &amp;&amp; 3 &gt; 2&nbsp;ok");
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        insta::assert_snapshot!(round_trip("a < b"), @"a &lt; b");
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_entities("&bogus; & &#xZZ;"), "&bogus; & &#xZZ;");
    }
}
