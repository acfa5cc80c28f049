// crates/feed-parser/src/error.rs
//! Error types for feed parsing

use thiserror::Error;

/// Result type for feed parser operations
pub type FeedResult<T> = Result<T, FeedError>;

/// Reasons a document could not be read as a feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// Document is empty or not XML at all
    #[error("Invalid XML: {0}")]
    InvalidXml(String),

    /// Well-formed XML whose root is neither RSS nor Atom
    #[error("Unsupported feed format: {0}")]
    UnsupportedFormat(String),

    /// Channel or feed element lacks a required child
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// Reader failed partway through the document
    #[error("XML parsing error: {0}")]
    XmlParse(String),
}

impl From<quick_xml::Error> for FeedError {
    fn from(err: quick_xml::Error) -> Self {
        FeedError::XmlParse(err.to_string())
    }
}
