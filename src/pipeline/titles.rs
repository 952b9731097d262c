//! Title resolution: map page ids to canonical titles from a book XML.
//!
//! The book XML is optional and best-effort. Any `page_node` element below
//! the root that carries both `id` and `title` contributes one mapping; a
//! later node with the same id replaces an earlier one. A book XML that is
//! missing or malformed yields an empty index and the run carries on with
//! the titles embedded in each page document.

use crate::error::DocumentError;
use crate::pipeline::nodes;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

const PAGE_NODE: &str = "page_node";

/// Page id → canonical page title.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleIndex {
    titles: HashMap<String, String>,
}

impl TitleIndex {
    /// Build an index from the text of a book XML.
    pub fn parse(text: &str) -> Result<Self, roxmltree::Error> {
        let doc = nodes::parse(text)?;
        let mut titles = HashMap::new();

        for node in nodes::descendants_named(doc.root_element(), PAGE_NODE) {
            if let (Some(id), Some(title)) = (node.attribute("id"), node.attribute("title")) {
                titles.insert(id.to_string(), title.to_string());
            }
        }

        debug!("Parsed {} page title mappings", titles.len());
        Ok(Self { titles })
    }

    /// Read and parse a book XML from disk.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path).map_err(|e| DocumentError::ReadFailed {
            detail: e.to_string(),
        })?;
        let text = nodes::decode(&bytes).map_err(|detail| DocumentError::ReadFailed { detail })?;
        let index = Self::parse(&text).map_err(|e| DocumentError::ParseFailed {
            detail: e.to_string(),
        })?;
        info!(
            "Loaded {} page mappings from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    /// Canonical title for `page_id`, if the book XML names one.
    pub fn get(&self, page_id: &str) -> Option<&str> {
        self.titles.get(page_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_page_nodes_are_indexed() {
        let index = TitleIndex::parse(
            r#"<book>
                 <page_node id="1" title="Chapter One">
                   <page_node id="1.1" title="Section"/>
                 </page_node>
                 <group><page_node id="2" title="Chapter Two"/></group>
               </book>"#,
        )
        .unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.get("1"), Some("Chapter One"));
        assert_eq!(index.get("1.1"), Some("Section"));
        assert_eq!(index.get("2"), Some("Chapter Two"));
    }

    #[test]
    fn nodes_missing_id_or_title_are_skipped() {
        let index = TitleIndex::parse(
            r#"<book>
                 <page_node id="1"/>
                 <page_node title="Orphan"/>
                 <page_node id="3" title="Kept"/>
               </book>"#,
        )
        .unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("1"), None);
        assert_eq!(index.get("3"), Some("Kept"));
    }

    #[test]
    fn duplicate_ids_last_write_wins() {
        let index = TitleIndex::parse(
            r#"<book><page_node id="7" title="First"/><page_node id="7" title="Second"/></book>"#,
        )
        .unwrap();
        assert_eq!(index.get("7"), Some("Second"));
    }

    #[test]
    fn root_page_node_is_not_indexed() {
        let index = TitleIndex::parse(r#"<page_node id="0" title="Root"/>"#).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = TitleIndex::load(&dir.path().join("book.xml")).unwrap_err();
        assert!(matches!(err, DocumentError::ReadFailed { .. }));
    }

    #[test]
    fn load_decodes_declared_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xml");
        std::fs::write(
            &path,
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><book><page_node id=\"1\" title=\"Caf\xe9\"/></book>",
        )
        .unwrap();
        let index = TitleIndex::load(&path).unwrap();
        assert_eq!(index.get("1"), Some("Caf\u{e9}"));
    }

    #[test]
    fn load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("book.xml");
        std::fs::write(&path, "<book><page_node id='1' title='x'></book>").unwrap();
        let err = TitleIndex::load(&path).unwrap_err();
        assert!(matches!(err, DocumentError::ParseFailed { .. }));
    }
}
