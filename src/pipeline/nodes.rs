//! Small `roxmltree` helpers shared by the title resolver and the collector.

use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use roxmltree::{Document, Node, ParsingOptions};
use std::borrow::Cow;

static RE_DECLARED_ENCODING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?-u)\A\s*<\?xml\s[^>]*?\bencoding\s*=\s*["']([A-Za-z0-9._:-]+)["']"#).unwrap()
});

/// Encoding named in the XML declaration, if any.
///
/// A declaration readable as ASCII cannot be UTF-16, so UTF-16 labels (and
/// the replacement encoding) resolve to UTF-8 here.
fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let caps = RE_DECLARED_ENCODING.captures(bytes)?;
    Encoding::for_label(caps.get(1)?.as_bytes()).map(Encoding::output_encoding)
}

/// Decode raw document bytes to text.
///
/// A byte-order mark wins, then the `encoding` of the XML declaration, then
/// UTF-8. Bytes that are invalid in the chosen encoding are an error.
pub fn decode(bytes: &[u8]) -> Result<Cow<'_, str>, String> {
    let encoding = match Encoding::for_bom(bytes) {
        Some((encoding, _)) => encoding,
        None => declared_encoding(bytes).unwrap_or(UTF_8),
    };
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(format!("stream did not contain valid {}", used.name()));
    }
    Ok(text)
}

/// Parse an XML document.
///
/// DTDs are allowed: page exports routinely carry a `<!DOCTYPE>` line and
/// the pipeline never validates against it. A leading byte-order mark is
/// ignored.
pub fn parse(text: &str) -> Result<Document<'_>, roxmltree::Error> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let opts = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    Document::parse_with_options(text, opts)
}

/// `true` when `node` is an element whose local name is `name`.
pub fn is_element_named(node: Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// Elements named `name` anywhere below `node`, in document order.
///
/// `node` itself is never yielded, even when it matches.
pub fn descendants_named<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.descendants()
        .skip(1)
        .filter(move |n| is_element_named(*n, name))
}
