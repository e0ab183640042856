//! Content summary document parsing.
//!
//! The consumer side of the endpoint: turns a response body back into a
//! summary, an empty result, or the fault it carries.

use std::collections::HashMap;

use nsbridge_core::ContentSummary;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::{is_xml_char, CONTENT_SUMMARY_TAG, REMOTE_EXCEPTION_TAG};

/// Errors raised while reading a document.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The document is not well-formed XML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document is XML but not a content summary document.
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Fault reported in place of a summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFault {
    /// Requested path.
    pub path: String,
    /// Origin failure classification.
    pub class: String,
    /// Failure message.
    pub message: String,
}

impl std::fmt::Display for RemoteFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.class, self.path, self.message)
    }
}

/// A parsed content summary document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryDocument {
    /// Populated root element.
    Summary(ContentSummary),
    /// Root element without attributes.
    Empty,
    /// Fault envelope.
    Fault(RemoteFault),
}

/// Parses a content summary response body.
///
/// # Errors
///
/// Returns an error if the body is not well-formed XML, is truncated, or
/// does not follow the content summary document shape.
pub fn parse_summary_document(xml: &str) -> Result<SummaryDocument, ReadError> {
    if let Some(c) = xml.chars().find(|c| !is_xml_char(*c)) {
        return Err(malformed(&format!("non-XML character U+{:04X}", u32::from(c))));
    }

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut root_seen = false;
    let mut root_attrs: Option<HashMap<String, String>> = None;
    let mut fault: Option<RemoteFault> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                handle_element(&e, depth, &mut root_seen, &mut root_attrs, &mut fault)?;
                depth += 1;
            }
            Event::Empty(e) => {
                handle_element(&e, depth, &mut root_seen, &mut root_attrs, &mut fault)?;
            }
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or_else(|| malformed("unbalanced end tag"))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(malformed("document ends inside an element"));
    }
    if let Some(fault) = fault {
        return Ok(SummaryDocument::Fault(fault));
    }
    match root_attrs {
        Some(attrs) if attrs.is_empty() => Ok(SummaryDocument::Empty),
        Some(attrs) => summary_from(&attrs).map(SummaryDocument::Summary),
        None => Err(malformed("no root element")),
    }
}

fn handle_element(
    e: &BytesStart<'_>,
    depth: usize,
    root_seen: &mut bool,
    root_attrs: &mut Option<HashMap<String, String>>,
    fault: &mut Option<RemoteFault>,
) -> Result<(), ReadError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    if depth == 0 {
        if *root_seen {
            return Err(malformed("more than one root element"));
        }
        *root_seen = true;
        return match name.as_str() {
            CONTENT_SUMMARY_TAG => {
                *root_attrs = Some(attributes(e)?);
                Ok(())
            }
            // Faults raised before the root was opened arrive as the root.
            REMOTE_EXCEPTION_TAG => {
                *fault = Some(fault_from(&attributes(e)?));
                Ok(())
            }
            other => Err(malformed(&format!("unexpected root element {other}"))),
        };
    }

    if depth == 1 && name == REMOTE_EXCEPTION_TAG {
        *fault = Some(fault_from(&attributes(e)?));
    }
    Ok(())
}

fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>, ReadError> {
    let mut attrs = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| malformed(&err.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attrs.insert(key, value);
    }
    Ok(attrs)
}

fn summary_from(attrs: &HashMap<String, String>) -> Result<ContentSummary, ReadError> {
    let field = |name: &str| -> Result<i64, ReadError> {
        let raw = attrs.get(name).ok_or_else(|| malformed(&format!("missing attribute {name}")))?;
        raw.parse().map_err(|_| malformed(&format!("attribute {name} is not an integer: {raw}")))
    };
    let summary = ContentSummary {
        length: field("length")?,
        file_count: field("fileCount")?,
        directory_count: field("directoryCount")?,
        quota: field("quota")?,
        space_consumed: field("spaceConsumed")?,
        space_quota: field("spaceQuota")?,
    };
    summary.validate().map_err(|e| malformed(&e.to_string()))?;
    Ok(summary)
}

fn fault_from(attrs: &HashMap<String, String>) -> RemoteFault {
    let get = |name: &str| attrs.get(name).cloned().unwrap_or_default();
    RemoteFault { path: get("path"), class: get("class"), message: get("message") }
}

fn malformed(msg: &str) -> ReadError {
    ReadError::Malformed(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

    #[test]
    fn test_parse_summary() {
        let xml = format!(
            "{DECL}<ContentSummary length=\"4096\" fileCount=\"2\" directoryCount=\"1\" \
             quota=\"-1\" spaceConsumed=\"4096\" spaceQuota=\"-1\"/>"
        );
        let doc = parse_summary_document(&xml).unwrap();
        assert_eq!(
            doc,
            SummaryDocument::Summary(ContentSummary {
                length: 4096,
                file_count: 2,
                directory_count: 1,
                quota: -1,
                space_consumed: 4096,
                space_quota: -1,
            })
        );
    }

    #[test]
    fn test_parse_empty() {
        let xml = format!("{DECL}<ContentSummary/>");
        assert_eq!(parse_summary_document(&xml).unwrap(), SummaryDocument::Empty);
    }

    #[test]
    fn test_parse_nested_fault() {
        let xml = format!(
            "{DECL}<ContentSummary><RemoteException path=\"non-relative\" \
             class=\"InvalidPathException\" message=\"Invalid file name: non-relative\"/>\
             </ContentSummary>"
        );
        let SummaryDocument::Fault(fault) = parse_summary_document(&xml).unwrap() else {
            panic!("Expected fault");
        };
        assert_eq!(fault.path, "non-relative");
        assert_eq!(fault.class, "InvalidPathException");
        assert_eq!(fault.message, "Invalid file name: non-relative");
    }

    #[test]
    fn test_parse_root_fault() {
        let xml =
            format!("{DECL}<RemoteException path=\"/x\" class=\"IOException\" message=\"m\"/>");
        assert!(matches!(parse_summary_document(&xml).unwrap(), SummaryDocument::Fault(_)));
    }

    #[test]
    fn test_character_references_decoded() {
        let xml = format!(
            "{DECL}<ContentSummary><RemoteException path=\"/a&#10;b&#9;c\" class=\"E\" \
             message=\"m\"/></ContentSummary>"
        );
        let SummaryDocument::Fault(fault) = parse_summary_document(&xml).unwrap() else {
            panic!("Expected fault");
        };
        assert_eq!(fault.path, "/a\nb\tc");
    }

    #[test]
    fn test_non_xml_character_rejected() {
        let xml = format!(
            "{DECL}<ContentSummary><RemoteException path=\"/a\u{1}b\" class=\"E\" \
             message=\"m\"/></ContentSummary>"
        );
        let err = parse_summary_document(&xml).unwrap_err();
        assert!(err.to_string().contains("U+0001"));
    }

    #[test]
    fn test_truncated_document_rejected() {
        let xml = format!("{DECL}<ContentSummary>");
        assert!(parse_summary_document(&xml).is_err());
        assert!(parse_summary_document(DECL).is_err());
    }

    #[test]
    fn test_missing_attribute_rejected() {
        let xml = format!("{DECL}<ContentSummary length=\"1\"/>");
        let err = parse_summary_document(&xml).unwrap_err();
        assert!(err.to_string().contains("fileCount"));
    }

    #[test]
    fn test_unexpected_root_rejected() {
        let xml = format!("{DECL}<FileStatus/>");
        assert!(parse_summary_document(&xml).is_err());
    }
}
