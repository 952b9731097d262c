//! CSV export of the sorted references.
//!
//! The format is deliberately minimal: a field containing a comma is wrapped
//! in double quotes, and nothing else is escaped. A title that itself
//! contains `",` or a newline therefore cannot be read back faithfully.

use crate::output::{MediaReference, MediaReferences};
use std::borrow::Cow;

/// Header row of `media_references.csv`.
pub const CSV_HEADER: &str = "media_type,source,title,xml_file,page_id,page_title";

fn quote(field: &str) -> Cow<'_, str> {
    if field.contains(',') {
        Cow::Owned(format!("\"{field}\""))
    } else {
        Cow::Borrowed(field)
    }
}

/// One CSV row (without line terminator). An absent page id is an empty field.
pub fn format_row(r: &MediaReference) -> String {
    [
        r.media_type.as_str(),
        r.source.as_str(),
        r.title.as_str(),
        r.xml_file.as_str(),
        r.page_id.as_deref().unwrap_or(""),
        r.page_title.as_str(),
    ]
    .iter()
    .map(|f| quote(f))
    .collect::<Vec<_>>()
    .join(",")
}

/// Header plus one row per reference, each line terminated by `\n`.
pub fn render_csv(refs: &MediaReferences) -> String {
    let mut out = String::with_capacity(64 * (refs.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for r in refs.values() {
        out.push_str(&format_row(r));
        out.push('\n');
    }
    out
}

/// Split one row written by [`format_row`] back into its fields.
///
/// Only fields containing a comma were quoted, so a `"…"` span counts as a
/// quoted field only when its inner text has a comma; any other field runs
/// to the next comma, quotes included. A field containing `",` cannot be
/// told apart from a field boundary.
pub fn parse_row(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = Vec::new();
    let mut rest = line;

    loop {
        if let Some((field, tail)) = rest.strip_prefix('"').and_then(quoted_field) {
            fields.push(field.to_string());
            match tail {
                Some(tail) => {
                    rest = tail;
                    continue;
                }
                None => break,
            }
        }
        match rest.find(',') {
            Some(i) => {
                fields.push(rest[..i].to_string());
                rest = &rest[i + 1..];
            }
            None => {
                fields.push(rest.to_string());
                break;
            }
        }
    }
    fields
}

/// Inner text of a quoted field (opening quote already stripped) and the
/// rest of the row after its closing `",`, or `None` at end of line.
///
/// The first `",` closes the span; without a comma inside, it was a bare
/// field that merely starts with a quote.
fn quoted_field(quoted: &str) -> Option<(&str, Option<&str>)> {
    let (inner, tail) = match quoted.find("\",") {
        Some(end) => (&quoted[..end], Some(&quoted[end + 2..])),
        None => (quoted.strip_suffix('"')?, None),
    };
    inner.contains(',').then_some((inner, tail))
}
