use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use tokio_stream::StreamExt;
use tracing::{debug, info, instrument};

use crate::{
    error::{Error, Result},
    extract::{PLAYLIST_HEADER, is_valid_url},
};

/// Where a playlist document comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The input is the document itself
    Raw,
    Url,
    File,
}

impl SourceKind {
    #[must_use]
    pub fn classify(source: &str) -> Self {
        let trimmed = source.trim();
        if trimmed.is_empty() || trimmed.starts_with(PLAYLIST_HEADER) || trimmed.contains('\n') {
            Self::Raw
        } else if is_valid_url(trimmed) {
            Self::Url
        } else {
            Self::File
        }
    }
}

/// Returns the playlist text behind `source`, which may be raw playlist text,
/// a URL or a file path.
///
/// # Errors
/// Fails when the file cannot be read or the download fails / answers with an
/// unsuccessful status
#[instrument(skip(client, source))]
pub async fn load(client: &reqwest::Client, source: &str, show_progress: bool) -> Result<String> {
    match SourceKind::classify(source) {
        SourceKind::Raw => {
            debug!("Treating input as raw playlist content");
            Ok(source.to_string())
        }
        SourceKind::Url => fetch(client, source.trim(), show_progress).await,
        SourceKind::File => {
            let path = Path::new(source.trim());
            info!("Reading playlist from {path:?}");
            let body = tokio::fs::read(path)
                .await
                .map_err(|e| Error::io(path, e))?;
            Ok(String::from_utf8_lossy(&body).into_owned())
        }
    }
}

async fn fetch(client: &reqwest::Client, url: &str, show_progress: bool) -> Result<String> {
    info!("Downloading playlist from {url}");
    let res = client.get(url).send().await?;

    if !res.status().is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status: res.status(),
        });
    }

    let pb = if show_progress {
        let pb = res.content_length().map_or_else(ProgressBar::no_length, ProgressBar::new);
        pb.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let mut body = Vec::new();
    let mut stream = res.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        pb.inc(chunk.len() as u64);
        body.extend_from_slice(&chunk);
    }
    pb.finish_and_clear();

    debug!("Downloaded {} bytes", body.len());
    Ok(String::from_utf8_lossy(&body).into_owned())
}
