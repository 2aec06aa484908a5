//! A small path-query engine for Eclipse metadata files.
//!
//! Queries are compiled once, registered on an [`XQueryHandler`] and then
//! evaluated together in a single pass over a document. Each query yields one
//! value per matching element, so queries that select different attributes of
//! the same element path produce parallel, index-aligned result lists:
//!
//! ```
//! use ant4eclipse::xquery::XQueryHandler;
//!
//! let mut handler = XQueryHandler::new();
//! let kinds = handler.add_query("//classpath/classpathentry/@kind").unwrap();
//! let paths = handler.add_query("//classpath/classpathentry/@path").unwrap();
//!
//! let results = handler
//!     .query_str(r#"<classpath><classpathentry kind="src" path="src"/></classpath>"#)
//!     .unwrap();
//! assert_eq!(results.single(kinds), Some("src"));
//! assert_eq!(results.single(paths), Some("src"));
//! ```
//!
//! Supported syntax:
//! - `/a/b` matches from the document root, `//a/b` matches at any depth
//! - a step is an element name or `*`, optionally followed by one predicate:
//!   `[@attr]`, `[@attr='value']`, `[@attr!='value']` or a 1-based position `[2]`
//! - the last segment may be `@attr` (attribute value) or `text()`; without
//!   it the element text is selected

mod handler;
mod query;

use std::path::PathBuf;

use thiserror::Error;

pub use handler::{QueryId, QueryResults, XQueryHandler};
pub use query::XQuery;

/// Errors raised while compiling or evaluating queries.
#[derive(Debug, Error)]
pub enum XQueryError {
    #[error("invalid query `{expression}`: {message}")]
    Syntax { expression: String, message: String },

    #[error("failed to read `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML in {origin}")]
    Xml {
        origin: String,
        #[source]
        source: roxmltree::Error,
    },
}
