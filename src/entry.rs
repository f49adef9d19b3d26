use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::query::FieldKey;

/// A metadata attribute in its serialized form.
///
/// * `None` - the key is left out of the entry entirely
/// * `Some(None)` - the key is present with a `null` value
/// * `Some(Some(v))` - the key is present with a value
pub type Attr = Option<Option<String>>;

/// Liveness of an entry's location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[default]
    #[serde(rename = "NOT CHECKED")]
    NotChecked,
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "BAD")]
    Bad,
}

impl Status {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotChecked => "NOT CHECKED",
            Self::Good => "GOOD",
            Self::Bad => "BAD",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `tvg-*` identity attributes of an entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tvg {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub id: Attr,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub name: Attr,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub url: Attr,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub code: Attr,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub name: Attr,
}

/// One stream of a playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub title: Attr,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub logo: Attr,
    /// Stream URI or local file path, never empty
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub category: Attr,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub language: Attr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvg: Option<Tvg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Country>,
    #[serde(default)]
    pub status: Status,
}

impl Entry {
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        text(&self.title)
    }

    #[must_use]
    pub fn logo(&self) -> Option<&str> {
        text(&self.logo)
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        text(&self.category)
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        text(&self.language)
    }

    /// Looks up the string form of a field.
    ///
    /// Returns `None` when the field is not part of this entry. A field that is
    /// present but `null` reads as an empty string.
    #[must_use]
    pub fn field(&self, key: &FieldKey) -> Option<&str> {
        match key {
            FieldKey::Simple(name) => match name.as_str() {
                "title" => value(&self.title),
                "logo" => value(&self.logo),
                "url" => Some(&self.url),
                "category" => value(&self.category),
                "language" => value(&self.language),
                "status" => Some(self.status.as_str()),
                _ => None,
            },
            FieldKey::Nested(group, member) => match (group.as_str(), member.as_str()) {
                ("tvg", "id") => self.tvg.as_ref().and_then(|t| value(&t.id)),
                ("tvg", "name") => self.tvg.as_ref().and_then(|t| value(&t.name)),
                ("tvg", "url") => self.tvg.as_ref().and_then(|t| value(&t.url)),
                ("country", "code") => self.country.as_ref().and_then(|c| value(&c.code)),
                ("country", "name") => self.country.as_ref().and_then(|c| value(&c.name)),
                _ => None,
            },
        }
    }
}

/// Applies the schema policy to one extracted value
pub(crate) fn attr(extracted: String, keep_empty: bool) -> Attr {
    if extracted.is_empty() {
        keep_empty.then_some(None)
    } else {
        Some(Some(extracted))
    }
}

/// The value of an attribute, if it has one
pub(crate) fn text(attr: &Attr) -> Option<&str> {
    attr.as_ref().and_then(|v| v.as_deref())
}

fn value(attr: &Attr) -> Option<&str> {
    attr.as_ref().map(|v| v.as_deref().unwrap_or_default())
}

// Keeps `null` apart from a missing key, which plain `Option<Option<_>>` merges
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Attr, D::Error> {
    Option::<String>::deserialize(deserializer).map(Some)
}
