//! Fetch command handler.
//!
//! Requests a content summary document from a running bridge and prints it.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use nsbridge_api::xml::{parse_summary_document, SummaryDocument};
use nsbridge_core::ContentSummary;
use reqwest::{Client, Url};

use crate::cli::{FetchArgs, OutputFormat};

/// Create an HTTP client for fetch requests.
fn create_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to create HTTP client")
}

/// Builds the summary URL for `path` below the bridge `endpoint`.
fn summary_url(endpoint: &str, path: &str, ugi: Option<&str>) -> Result<Url> {
    let mut url = Url::parse(endpoint).with_context(|| format!("Invalid endpoint: {endpoint}"))?;
    url.path_segments_mut()
        .map_err(|()| anyhow!("Endpoint cannot be a base URL: {endpoint}"))?
        .pop_if_empty()
        .push("contentSummary")
        .extend(path.split('/').filter(|segment| !segment.is_empty()));
    if let Some(ugi) = ugi {
        url.query_pairs_mut().append_pair("ugi", ugi);
    }
    Ok(url)
}

/// Handle the fetch command.
pub async fn handle_fetch(args: FetchArgs) -> Result<()> {
    let client = create_client()?;
    let url = summary_url(&args.endpoint, &args.path, args.ugi.as_deref())?;

    let response =
        client.get(url).send().await.context("Failed to connect to bridge endpoint")?;

    let status = response.status();
    let body = response.text().await.context("Failed to read response body")?;
    if !status.is_success() {
        anyhow::bail!("Content summary request failed ({}): {}", status, body.trim());
    }

    let document = parse_summary_document(&body).context("Failed to parse summary document")?;

    match document {
        SummaryDocument::Fault(fault) => {
            anyhow::bail!("Metadata service reported {fault}");
        }
        SummaryDocument::Empty => match args.format {
            OutputFormat::Json => println!("null"),
            OutputFormat::Text => println!("No summary available for {}", args.path),
        },
        SummaryDocument::Summary(summary) => match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
            OutputFormat::Text => print_summary(&args.path, &summary),
        },
    }

    Ok(())
}

fn print_summary(path: &str, summary: &ContentSummary) {
    println!("Content Summary: {path}");
    println!("================");
    println!("  Length:          {}", summary.length);
    println!("  Files:           {}", summary.file_count);
    println!("  Directories:     {}", summary.directory_count);
    println!("  Quota:           {}", format_quota(summary.quota));
    println!("  Space Consumed:  {}", summary.space_consumed);
    println!("  Space Quota:     {}", format_quota(summary.space_quota));
}

fn format_quota(quota: i64) -> String {
    if quota == ContentSummary::UNLIMITED {
        "none".to_string()
    } else {
        quota.to_string()
    }
}
