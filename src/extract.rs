use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

pub const PLAYLIST_HEADER: &str = "#EXTM3U";
pub const DIRECTIVE_MARKER: &str = "#EXTINF";

pub static TITLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(?:[^",]*"[^"]*")*[^",]*,(.*)$"#).unwrap());
pub static LOGO_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"tvg-logo="(.*?)""#).unwrap());
pub static CATEGORY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"group-title="(.*?)""#).unwrap());
pub static LANGUAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"tvg-language="(.*?)""#).unwrap());
pub static COUNTRY_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"tvg-country="(.*?)""#).unwrap());
pub static TVG_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"tvg-id="(.*?)""#).unwrap());
pub static TVG_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"tvg-name="(.*?)""#).unwrap());
pub static TVG_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"tvg-url="(.*?)""#).unwrap());

/// `C:\dir\file.ext` or `/dir/file.ext`, with a 3 to 5 character extension
pub static LOCAL_PATH_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]:\\(?:.*?\\)*.*\.[\d\w]{3,5}$|^(?:/[^/]*)+/?\.[\d\w]{3,5}$").unwrap()
});

/// Every field the extractor pulls out of a directive line.
///
/// Fields the line does not carry are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub title: String,
    pub logo: String,
    pub category: String,
    pub language: String,
    pub country_code: String,
    pub tvg_id: String,
    pub tvg_name: String,
    pub tvg_url: String,
}

impl Fields {
    #[must_use]
    pub fn extract(line: &str) -> Self {
        Self {
            title: capture(&TITLE_REGEX, line).trim().to_string(),
            logo: capture(&LOGO_REGEX, line),
            category: capture(&CATEGORY_REGEX, line),
            language: capture(&LANGUAGE_REGEX, line),
            country_code: capture(&COUNTRY_CODE_REGEX, line),
            tvg_id: capture(&TVG_ID_REGEX, line),
            tvg_name: capture(&TVG_NAME_REGEX, line),
            tvg_url: capture(&TVG_URL_REGEX, line),
        }
    }
}

/// First capture group of `regex` in `content`, or an empty string
#[must_use]
pub fn capture(regex: &Regex, content: &str) -> String {
    regex
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Splits a document into trimmed, non-empty lines
#[must_use]
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Absolute URL with both a scheme and a host
#[must_use]
pub fn is_valid_url(input: &str) -> bool {
    Url::parse(input).is_ok_and(|url| !url.scheme().is_empty() && url.has_host())
}

#[must_use]
pub fn looks_like_local_path(input: &str) -> bool {
    LOCAL_PATH_REGEX.is_match(input)
}
