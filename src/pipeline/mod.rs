//! Pipeline stages for media extraction.
//!
//! Each submodule implements exactly one step; [`crate::extract`] drives
//! them in order.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ titles ──▶ collect ──▶ sort ──▶ csv / report ──▶ organize
//! (zip?)    (book)     (pages)     (key)    (artefacts)      (copies)
//! ```
//!
//! 1. [`input`]: stage a folder or unpack a `.zip` into a temp folder
//! 2. [`titles`]: page id → title index from the optional book XML
//! 3. [`collect`]: scan each page document for media nodes, last write wins
//! 4. [`sort`]: numeric-first page-title ordering
//! 5. [`csv`] and [`report`]: the two text artefacts
//! 6. [`organize`]: copy media into type and page folders

pub mod collect;
pub mod csv;
pub mod input;
pub mod nodes;
pub mod organize;
pub mod report;
pub mod sort;
pub mod titles;
