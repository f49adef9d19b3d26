use std::{fmt::Write as _, path::Path};

use tracing::info;

use crate::{
    entry::{Entry, text},
    error::{Error, Result},
    extract::PLAYLIST_HEADER,
};

/// Pretty-printed JSON array of the entries
///
/// # Errors
/// Errors when serialization fails
pub fn to_json(entries: &[Entry]) -> Result<String> {
    Ok(serde_json::to_string_pretty(entries)?)
}

/// Regenerates an extended M3U document, writing only the attributes that carry a value
#[must_use]
pub fn to_m3u(entries: &[Entry]) -> String {
    let mut out = String::from(PLAYLIST_HEADER);
    out.push('\n');

    for entry in entries {
        let tvg = entry.tvg.as_ref();
        let country = entry.country.as_ref();
        let attributes = [
            ("tvg-id", tvg.and_then(|t| text(&t.id))),
            ("tvg-name", tvg.and_then(|t| text(&t.name))),
            ("tvg-url", tvg.and_then(|t| text(&t.url))),
            ("tvg-logo", entry.logo()),
            ("tvg-country", country.and_then(|c| text(&c.code))),
            ("tvg-language", entry.language()),
            ("group-title", entry.category()),
        ];

        out.push_str("#EXTINF:-1");
        for (name, value) in attributes {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                let _ = write!(out, " {name}=\"{value}\"");
            }
        }
        let _ = writeln!(out, ",{}", entry.title().unwrap_or_default());
        out.push_str(&entry.url);
        out.push('\n');
    }

    out
}

/// Writes `entries` to `path`: `.json` as JSON, `.m3u` / `.m3u8` as a playlist
///
/// # Errors
/// Errors on unsupported extensions or when the file cannot be written
pub async fn save_to_file(entries: &[Entry], path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let content = match extension.as_deref() {
        Some("json") => to_json(entries)?,
        Some("m3u" | "m3u8") => to_m3u(entries),
        _ => return Err(Error::UnsupportedFormat(path.to_path_buf())),
    };

    tokio::fs::write(path, content)
        .await
        .map_err(|e| Error::io(path, e))?;
    info!("Saved {} entries to {path:?}", entries.len());

    Ok(())
}
