//! EPUB CFI (Canonical Fragment Identifier) engine
//!
//! Reflowable e-book content has no fixed page numbers, yet bookmarks,
//! annotations, TOC entries, and search results must all reference exact,
//! stable locations inside a document tree. CFIs encode a path through
//! that tree, reinforced by optional element-ID assertions for resilience
//! against structural drift, plus an optional character offset,
//! optionally expressed as a start/end range sharing a common parent.
//!
//! # Example CFI
//!
//! ```text
//! epubcfi(/6/4[chap01ref]!/4/2/1:42)
//!         │  │           │ │ │ │ └── character offset 42
//!         │  │           │ │ │ └──── text node (odd = character data)
//!         │  │           │ │ └────── element index
//!         │  │           │ └──────── element index (body)
//!         │  │           └────────── indirection (into content doc)
//!         │  └────────────────────── spine item with ID assertion
//!         └───────────────────────── spine element
//! ```
//!
//! # Usage
//!
//! Parsing, serializing, and comparing are pure string/structure work:
//!
//! ```
//! use std::cmp::Ordering;
//!
//! let cfi = epub_cfi::parse("epubcfi(/6/4[chap01ref]!/4/2/1:42)").unwrap();
//! assert_eq!(cfi.to_string(), "epubcfi(/6/4[chap01ref]!/4/2/1:42)");
//!
//! let order = epub_cfi::compare_str("/6/4!/4/2/1:10", "/6/4!/4/2/1:20").unwrap();
//! assert_eq!(order, Ordering::Less);
//! ```
//!
//! Resolution and extraction run against any tree exposed through
//! [`NodeLike`]; an adapter for `roxmltree` documents is built in:
//!
//! ```
//! use epub_cfi::{from_range, parse, to_range};
//!
//! let doc = roxmltree::Document::parse(
//!     r#"<html><body><p id="p1">Hello, World</p></body></html>"#,
//! )
//! .unwrap();
//! let root = doc.root_element();
//!
//! let cfi = parse("/2/2[p1],/1:0,/1:5").unwrap();
//! let range = to_range(&root, &cfi, None).unwrap();
//! assert_eq!(range.text(None), "Hello");
//! assert_eq!(
//!     from_range(&range, None).to_string(),
//!     "epubcfi(/2/2[p1],/1:0,/1:5)",
//! );
//! ```
//!
//! All operations are pure and synchronous: no I/O, no internal mutable
//! state beyond the tree arguments supplied per call.

mod comparator;
mod escape;
mod extractor;
pub mod fake;
mod node;
mod parser;
mod resolver;
mod types;
mod xml;

// Escaping
pub use escape::{escape, unescape};

// Data model
pub use types::{Cfi, CfiRange, Segment, Step};

// Parser
pub use parser::{parse, try_parse, ParseError};

// Comparator
pub use comparator::{compare, compare_str, is_after, is_before, is_in_range};

// Tree access
pub use node::{FilterAction, NodeFilter, NodeKind, NodeLike};

// Resolver
pub use resolver::{to_element, to_range, Location, Range, ResolveError};

// Extractor
pub use extractor::{from_element, from_elements, from_range};

// Indirection splicing
pub use fake::join_indir;
