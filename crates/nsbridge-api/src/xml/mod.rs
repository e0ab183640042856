//! XML document writing and reading.

pub mod fault;
pub mod reader;
pub mod writer;

pub use fault::{write_remote_failure, REMOTE_EXCEPTION_TAG};
pub use reader::{parse_summary_document, ReadError, RemoteFault, SummaryDocument};
pub use writer::{escape_attribute, escape_text, is_xml_char, WriterState, XmlError, XmlWriter};

/// Root element of every content summary document.
pub const CONTENT_SUMMARY_TAG: &str = "ContentSummary";
