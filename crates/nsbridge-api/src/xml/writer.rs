// Copyright 2026 The nsbridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Incremental XML writer.
//!
//! Every call goes straight to the wrapped stream; nothing is buffered
//! beyond what the stream itself buffers. The writer tracks where it is in
//! the document so out-of-order calls fail instead of producing malformed
//! output.

use quick_xml::escape::escape;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Errors raised while writing a document.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// The call is not allowed at the current position in the document.
    #[error("{operation} not allowed in state {state:?}")]
    InvalidState {
        /// The rejected operation.
        operation: &'static str,
        /// Writer state when the call was made.
        state: WriterState,
    },

    /// The underlying stream failed, typically because the client went away.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Position of the writer within the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing written yet.
    Initial,
    /// Declaration written, root not yet opened.
    Prolog,
    /// Inside a start tag; attributes may follow.
    StartTag,
    /// Inside an element's content.
    Content,
    /// Root element closed.
    Epilog,
    /// Document finished and stream shut down.
    Ended,
}

/// Writes one XML document to an async stream.
#[derive(Debug)]
pub struct XmlWriter<W> {
    out: W,
    state: WriterState,
    open: Vec<String>,
}

impl<W: AsyncWrite + Unpin> XmlWriter<W> {
    /// Wraps `out`. The writer is good for exactly one document.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self { out, state: WriterState::Initial, open: Vec::new() }
    }

    /// Current position within the document.
    #[must_use]
    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Writes the XML declaration. Must be the first call.
    ///
    /// # Errors
    ///
    /// Fails if anything was written before or the stream fails.
    pub async fn declaration(&mut self) -> Result<(), XmlError> {
        self.check_state("declaration", &[WriterState::Initial])?;
        self.out.write_all(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n").await?;
        self.state = WriterState::Prolog;
        Ok(())
    }

    /// Opens an element.
    ///
    /// # Errors
    ///
    /// Fails before the declaration, after the root element was closed, or
    /// if the stream fails.
    pub async fn start_tag(&mut self, name: &str) -> Result<(), XmlError> {
        self.check_state(
            "start_tag",
            &[WriterState::Prolog, WriterState::StartTag, WriterState::Content],
        )?;
        if self.state == WriterState::StartTag {
            self.out.write_all(b">").await?;
        }
        self.out.write_all(format!("<{name}").as_bytes()).await?;
        self.open.push(name.to_string());
        self.state = WriterState::StartTag;
        Ok(())
    }

    /// Adds an attribute to the element opened last.
    ///
    /// # Errors
    ///
    /// Fails unless called directly after [`Self::start_tag`] or another
    /// attribute, or if the stream fails.
    pub async fn attribute(&mut self, name: &str, value: &str) -> Result<(), XmlError> {
        self.check_state("attribute", &[WriterState::StartTag])?;
        let attribute = format!(" {name}=\"{}\"", escape_attribute(value));
        self.out.write_all(attribute.as_bytes()).await?;
        Ok(())
    }

    /// Closes the element opened last.
    ///
    /// # Errors
    ///
    /// Fails if no element is open or the stream fails.
    pub async fn end_tag(&mut self) -> Result<(), XmlError> {
        self.check_state("end_tag", &[WriterState::StartTag, WriterState::Content])?;
        let Some(name) = self.open.pop() else {
            return Err(XmlError::InvalidState { operation: "end_tag", state: self.state });
        };
        if self.state == WriterState::StartTag {
            self.out.write_all(b"/>").await?;
        } else {
            self.out.write_all(format!("</{name}>").as_bytes()).await?;
        }
        self.state = if self.open.is_empty() { WriterState::Epilog } else { WriterState::Content };
        Ok(())
    }

    /// Closes every open element, flushes and shuts the stream down.
    ///
    /// Must be the last call and may only be made once.
    ///
    /// # Errors
    ///
    /// Fails before the declaration, on a second call, or if the stream fails.
    pub async fn end_document(&mut self) -> Result<(), XmlError> {
        self.check_state(
            "end_document",
            &[
                WriterState::Prolog,
                WriterState::StartTag,
                WriterState::Content,
                WriterState::Epilog,
            ],
        )?;
        while !self.open.is_empty() {
            self.end_tag().await?;
        }
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        self.out.shutdown().await?;
        self.state = WriterState::Ended;
        Ok(())
    }

    fn check_state(
        &self,
        operation: &'static str,
        allowed: &[WriterState],
    ) -> Result<(), XmlError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(XmlError::InvalidState { operation, state: self.state })
        }
    }
}

/// Escapes `value` for a double-quoted attribute.
///
/// Characters XML 1.0 cannot carry become U+FFFD. Tab, line feed and
/// carriage return become character references so attribute-value
/// normalization leaves them intact.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in escape(value).chars() {
        match c {
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(replace_non_xml(c)),
        }
    }
    out
}

/// Escapes `value` for element content, replacing characters XML 1.0
/// cannot carry with U+FFFD.
#[must_use]
pub fn escape_text(value: &str) -> String {
    escape(value).chars().map(replace_non_xml).collect()
}

fn replace_non_xml(c: char) -> char {
    if is_xml_char(c) {
        c
    } else {
        char::REPLACEMENT_CHARACTER
    }
}

/// Whether `c` matches the XML 1.0 `Char` production.
#[must_use]
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}'
            | '\u{A}'
            | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finish(xml: XmlWriter<Vec<u8>>) -> String {
        String::from_utf8(xml.into_inner()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_root() {
        let mut xml = XmlWriter::new(Vec::new());
        xml.declaration().await.unwrap();
        xml.start_tag("ContentSummary").await.unwrap();
        xml.end_tag().await.unwrap();
        xml.end_document().await.unwrap();

        assert_eq!(
            finish(xml),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<ContentSummary/>\n"
        );
    }

    #[tokio::test]
    async fn test_attributes_and_nesting() {
        let mut xml = XmlWriter::new(Vec::new());
        xml.declaration().await.unwrap();
        xml.start_tag("a").await.unwrap();
        xml.attribute("x", "1").await.unwrap();
        xml.start_tag("b").await.unwrap();
        xml.attribute("y", "2").await.unwrap();
        xml.end_tag().await.unwrap();
        xml.end_tag().await.unwrap();
        xml.end_document().await.unwrap();

        assert!(finish(xml).ends_with("<a x=\"1\"><b y=\"2\"/></a>\n"));
    }

    #[tokio::test]
    async fn test_attribute_values_are_escaped() {
        let mut xml = XmlWriter::new(Vec::new());
        xml.declaration().await.unwrap();
        xml.start_tag("e").await.unwrap();
        xml.attribute("message", "a < b & \"c\"").await.unwrap();
        xml.end_document().await.unwrap();

        let out = finish(xml);
        assert!(out.contains("message=\"a &lt; b &amp; &quot;c&quot;\""));
    }

    #[tokio::test]
    async fn test_control_characters_are_replaced() {
        let mut xml = XmlWriter::new(Vec::new());
        xml.declaration().await.unwrap();
        xml.start_tag("e").await.unwrap();
        xml.attribute("path", "/a\u{1}b\u{FFFE}").await.unwrap();
        xml.end_document().await.unwrap();

        let out = finish(xml);
        assert!(out.contains("path=\"/a\u{FFFD}b\u{FFFD}\""));
        assert!(out.chars().all(is_xml_char));
    }

    #[tokio::test]
    async fn test_attribute_whitespace_is_referenced() {
        let mut xml = XmlWriter::new(Vec::new());
        xml.declaration().await.unwrap();
        xml.start_tag("e").await.unwrap();
        xml.attribute("path", "/a\nb\tc\rd").await.unwrap();
        xml.end_document().await.unwrap();

        assert!(finish(xml).contains("path=\"/a&#10;b&#9;c&#13;d\""));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b\u{0}"), "a &lt; b\u{FFFD}");
        assert_eq!(escape_text("line\nbreak"), "line\nbreak");
    }

    #[tokio::test]
    async fn test_end_document_closes_open_elements() {
        let mut xml = XmlWriter::new(Vec::new());
        xml.declaration().await.unwrap();
        xml.start_tag("a").await.unwrap();
        xml.start_tag("b").await.unwrap();
        xml.end_document().await.unwrap();

        assert_eq!(xml.state(), WriterState::Ended);
        assert!(finish(xml).ends_with("<a><b/></a>\n"));
    }

    #[tokio::test]
    async fn test_end_document_only_once() {
        let mut xml = XmlWriter::new(Vec::new());
        xml.declaration().await.unwrap();
        xml.end_document().await.unwrap();

        let err = xml.end_document().await.unwrap_err();
        assert!(matches!(err, XmlError::InvalidState { operation: "end_document", .. }));
    }

    #[tokio::test]
    async fn test_out_of_order_calls_rejected() {
        let mut xml = XmlWriter::new(Vec::new());
        assert!(xml.start_tag("a").await.is_err());
        assert!(xml.end_document().await.is_err());

        xml.declaration().await.unwrap();
        assert!(xml.declaration().await.is_err());
        assert!(xml.attribute("x", "1").await.is_err());
        assert!(xml.end_tag().await.is_err());

        xml.start_tag("a").await.unwrap();
        xml.start_tag("b").await.unwrap();
        xml.end_tag().await.unwrap();
        assert!(xml.attribute("late", "1").await.is_err());
        xml.end_tag().await.unwrap();

        assert_eq!(xml.state(), WriterState::Epilog);
        assert!(xml.start_tag("second-root").await.is_err());
    }
}
