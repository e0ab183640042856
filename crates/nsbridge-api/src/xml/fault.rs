//! Fault envelope for failed metadata calls.
//!
//! Faults travel in-band: the response stays `200 OK` and the document
//! carries a `RemoteException` element inside the root:
//!
//! ```text
//! <ContentSummary><RemoteException path="/p" class="..." message="..."/></ContentSummary>
//! ```

use nsbridge_core::RemoteFailure;
use tokio::io::AsyncWrite;

use super::writer::{XmlError, XmlWriter};

/// Element name of the fault envelope.
pub const REMOTE_EXCEPTION_TAG: &str = "RemoteException";

/// Writes `failure` for the requested `path` as a complete element.
///
/// # Errors
///
/// Returns an error if the writer is not inside an element or the stream fails.
pub async fn write_remote_failure<W>(
    xml: &mut XmlWriter<W>,
    path: &str,
    failure: &RemoteFailure,
) -> Result<(), XmlError>
where
    W: AsyncWrite + Unpin,
{
    xml.start_tag(REMOTE_EXCEPTION_TAG).await?;
    xml.attribute("path", path).await?;
    xml.attribute("class", &failure.category).await?;
    xml.attribute("message", &failure.summary_message()).await?;
    xml.end_tag().await
}
