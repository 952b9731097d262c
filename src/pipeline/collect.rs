//! Reference collection: scan page documents for media nodes.
//!
//! Each page document is parsed on its own. A document that cannot be read
//! or parsed is recorded with its error and contributes nothing; the next
//! document is processed as usual.
//!
//! ## Page identity
//!
//! The page id and embedded title come from the first `page_node` child of
//! the root, or from the root itself when it is a `page_node` with an `id`.
//! A title found in the book XML for that id replaces the embedded one.
//!
//! ## Deduplication
//!
//! References are keyed by their `src` value. When two documents reference
//! the same source, the document processed later wins and the entry keeps
//! its original insertion slot.

use crate::error::DocumentError;
use crate::output::{
    DocumentResult, MediaReference, MediaReferences, MediaType, NO_TITLE, UNKNOWN_PAGE,
};
use crate::pipeline::nodes;
use crate::pipeline::titles::TitleIndex;
use roxmltree::Node;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PAGE_NODE: &str = "page_node";

/// A page document found in the XML folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    pub file_name: String,
    pub path: PathBuf,
}

/// Page id and resolved title for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub page_id: Option<String>,
    pub page_title: String,
}

/// List the `*.xml` files at the top level of `dir`, in directory order.
///
/// Sub-directories are ignored, as are names that are not valid UTF-8.
pub fn list_documents(dir: &Path) -> io::Result<Vec<PageDocument>> {
    let mut docs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.ends_with(".xml") {
            docs.push(PageDocument {
                file_name: name,
                path: entry.path(),
            });
        }
    }
    Ok(docs)
}

/// Determine the page id and title for a parsed document.
pub fn page_info(root: Node<'_, '_>, titles: &TitleIndex) -> PageInfo {
    let mut page_id = None;
    let mut page_title = UNKNOWN_PAGE.to_string();

    if let Some(page) = root.children().find(|n| nodes::is_element_named(*n, PAGE_NODE)) {
        page_id = page.attribute("id").map(str::to_string);
        if let Some(title) = page.attribute("title") {
            page_title = title.to_string();
        }
    } else if nodes::is_element_named(root, PAGE_NODE) {
        if let Some(id) = root.attribute("id") {
            page_id = Some(id.to_string());
            if let Some(title) = root.attribute("title") {
                page_title = title.to_string();
            }
        }
    }

    if let Some(canonical) = page_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .and_then(|id| titles.get(id))
    {
        page_title = canonical.to_string();
    }

    PageInfo {
        page_id,
        page_title,
    }
}

/// Every media node below `root` that carries a `src`.
///
/// All images come first, then all videos, then all audio; within a kind the
/// order is document order.
pub fn scan_media(root: Node<'_, '_>, xml_file: &str, page: &PageInfo) -> Vec<MediaReference> {
    let mut media = Vec::new();
    for media_type in MediaType::ALL {
        for node in nodes::descendants_named(root, media_type.node_name()) {
            let Some(src) = node.attribute("src") else {
                continue;
            };
            media.push(MediaReference {
                source: src.to_string(),
                media_type,
                title: node.attribute("title").unwrap_or(NO_TITLE).to_string(),
                xml_file: xml_file.to_string(),
                page_id: page.page_id.clone(),
                page_title: page.page_title.clone(),
            });
        }
    }
    media
}

/// Collect the media of one document held in memory.
pub fn collect_text(text: &str, file_name: &str, titles: &TitleIndex) -> DocumentResult {
    match nodes::parse(text) {
        Ok(doc) => {
            let root = doc.root_element();
            let page = page_info(root, titles);
            let media = scan_media(root, file_name, &page);
            debug!(
                "{}: page {:?} ({}), {} media nodes",
                file_name,
                page.page_id,
                page.page_title,
                media.len()
            );
            DocumentResult {
                file_name: file_name.to_string(),
                page_id: page.page_id,
                page_title: page.page_title,
                media,
                error: None,
            }
        }
        Err(e) => failed(
            file_name,
            DocumentError::ParseFailed {
                detail: e.to_string(),
            },
        ),
    }
}

/// Read and collect one page document.
///
/// The bytes are decoded per BOM or XML declaration before parsing.
pub fn collect_document(doc: &PageDocument, titles: &TitleIndex) -> DocumentResult {
    let text = std::fs::read(&doc.path)
        .map_err(|e| e.to_string())
        .and_then(|bytes| nodes::decode(&bytes).map(|text| text.into_owned()));
    match text {
        Ok(text) => collect_text(&text, &doc.file_name, titles),
        Err(detail) => failed(&doc.file_name, DocumentError::ReadFailed { detail }),
    }
}

fn failed(file_name: &str, error: DocumentError) -> DocumentResult {
    warn!("Error processing {}: {}", file_name, error);
    DocumentResult {
        file_name: file_name.to_string(),
        page_id: None,
        page_title: UNKNOWN_PAGE.to_string(),
        media: Vec::new(),
        error: Some(error),
    }
}

/// Accumulates references across documents, last write wins per source.
#[derive(Debug, Default)]
pub struct Collector {
    references: MediaReferences,
    documents: Vec<DocumentResult>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one document's media into the mapping and keep its result.
    pub fn add(&mut self, result: DocumentResult) {
        for media in &result.media {
            self.references.insert(media.source.clone(), media.clone());
        }
        self.documents.push(result);
    }

    /// Hand back the unsorted mapping and the per-document results.
    pub fn finish(self) -> (MediaReferences, Vec<DocumentResult>) {
        (self.references, self.documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(text: &str) -> DocumentResult {
        collect_text(text, "page.xml", &TitleIndex::default())
    }

    #[test]
    fn page_node_child_supplies_id_and_title() {
        let r = collect(
            r#"<page><page_node id="1" title="Intro"/><image_node src="a.jpg" title="Cover"/></page>"#,
        );
        assert_eq!(r.page_id.as_deref(), Some("1"));
        assert_eq!(r.page_title, "Intro");
        assert_eq!(r.media.len(), 1);
        assert_eq!(r.media[0].source, "a.jpg");
        assert_eq!(r.media[0].title, "Cover");
        assert_eq!(r.media[0].page_title, "Intro");
    }

    #[test]
    fn only_first_page_node_child_counts() {
        let r = collect(
            r#"<page><page_node id="1" title="First"/><page_node id="2" title="Second"/></page>"#,
        );
        assert_eq!(r.page_id.as_deref(), Some("1"));
        assert_eq!(r.page_title, "First");
    }

    #[test]
    fn root_page_node_used_when_no_child() {
        let r = collect(r#"<page_node id="9" title="Nine"><image_node src="x.png"/></page_node>"#);
        assert_eq!(r.page_id.as_deref(), Some("9"));
        assert_eq!(r.page_title, "Nine");
    }

    #[test]
    fn root_page_node_without_id_keeps_placeholder() {
        let r = collect(r#"<page_node title="Ignored"><image_node src="x.png"/></page_node>"#);
        assert_eq!(r.page_id, None);
        assert_eq!(r.page_title, UNKNOWN_PAGE);
    }

    #[test]
    fn page_node_without_title_keeps_placeholder() {
        let r = collect(r#"<page><page_node id="100"/><video_node src="b.mp4"/></page>"#);
        assert_eq!(r.page_id.as_deref(), Some("100"));
        assert_eq!(r.page_title, UNKNOWN_PAGE);
    }

    #[test]
    fn index_title_overrides_embedded_title() {
        let titles = TitleIndex::parse(r#"<book><page_node id="1" title="Chapter One"/></book>"#)
            .unwrap();
        let r = collect_text(
            r#"<page><page_node id="1" title="Intro"/><image_node src="a.jpg"/></page>"#,
            "page1.xml",
            &titles,
        );
        assert_eq!(r.page_title, "Chapter One");
        assert_eq!(r.media[0].page_title, "Chapter One");
    }

    #[test]
    fn empty_page_id_skips_index_lookup() {
        let titles =
            TitleIndex::parse(r#"<book><page_node id="" title="Blank"/></book>"#).unwrap();
        let r = collect_text(
            r#"<page><page_node id="" title="Local"/><image_node src="a.jpg"/></page>"#,
            "page.xml",
            &titles,
        );
        assert_eq!(r.page_id.as_deref(), Some(""));
        assert_eq!(r.page_title, "Local");
    }

    #[test]
    fn latin1_document_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cafe.xml");
        std::fs::write(
            &path,
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<page><page_node id=\"5\" title=\"Caf\xe9\"/><image_node src=\"menu.png\"/></page>",
        )
        .unwrap();
        let doc = PageDocument {
            file_name: "cafe.xml".into(),
            path,
        };
        let r = collect_document(&doc, &TitleIndex::default());
        assert!(r.error.is_none(), "got: {:?}", r.error);
        assert_eq!(r.page_title, "Caf\u{e9}");
        assert_eq!(r.media.len(), 1);
    }

    #[test]
    fn invalid_utf8_without_declaration_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xml");
        std::fs::write(&path, b"<page title=\"Caf\xe9\"/>").unwrap();
        let doc = PageDocument {
            file_name: "bad.xml".into(),
            path,
        };
        let r = collect_document(&doc, &TitleIndex::default());
        assert!(matches!(r.error, Some(DocumentError::ReadFailed { .. })));
    }

    #[test]
    fn missing_src_is_skipped_and_missing_title_gets_placeholder() {
        let r = collect(r#"<page><image_node title="No source"/><audio_node src="s.mp3"/></page>"#);
        assert!(r.error.is_none());
        assert_eq!(r.media.len(), 1);
        assert_eq!(r.media[0].source, "s.mp3");
        assert_eq!(r.media[0].title, NO_TITLE);
        assert_eq!(r.media[0].media_type, MediaType::Audio);
    }

    #[test]
    fn media_found_at_any_depth_grouped_by_kind() {
        let r = collect(
            r#"<page>
                 <section><audio_node src="1.mp3"/></section>
                 <div><div><image_node src="2.png"/></div></div>
                 <video_node src="3.mp4"/>
                 <image_node src="4.png"/>
               </page>"#,
        );
        let sources: Vec<_> = r.media.iter().map(|m| m.source.as_str()).collect();
        assert_eq!(sources, vec!["2.png", "4.png", "3.mp4", "1.mp3"]);
    }

    #[test]
    fn malformed_document_reports_error_and_no_media() {
        let r = collect("<page><image_node src='a.png'></page>");
        assert!(matches!(r.error, Some(DocumentError::ParseFailed { .. })));
        assert!(r.media.is_empty());
    }

    #[test]
    fn collector_last_write_wins() {
        let mut collector = Collector::new();
        collector.add(collect_text(
            r#"<page><page_node id="1" title="One"/><image_node src="img.png" title="Old"/></page>"#,
            "a.xml",
            &TitleIndex::default(),
        ));
        collector.add(collect_text(
            r#"<page><page_node id="2" title="Two"/><image_node src="img.png" title="New"/><image_node src="other.png"/></page>"#,
            "b.xml",
            &TitleIndex::default(),
        ));
        let (refs, docs) = collector.finish();
        assert_eq!(docs.len(), 2);
        assert_eq!(refs.len(), 2);
        let r = &refs["img.png"];
        assert_eq!(r.title, "New");
        assert_eq!(r.xml_file, "b.xml");
        assert_eq!(r.page_title, "Two");
        // the overwritten entry keeps its first insertion slot
        assert_eq!(refs.get_index(0).map(|(k, _)| k.as_str()), Some("img.png"));
    }

    #[test]
    fn list_documents_filters_extension_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.xml"), "<page/>").unwrap();
        std::fs::write(dir.path().join("b.XML"), "<page/>").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested.xml")).unwrap();
        let docs = list_documents(dir.path()).unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.xml"]);
    }
}
