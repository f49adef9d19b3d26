use std::fmt;

use crate::{
    Entry,
    error::{Error, Result},
};

/// Addresses one field of an [`Entry`], either top-level (`category`) or a member
/// of a group (`tvg-id`, `country-code`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKey {
    Simple(String),
    Nested(String, String),
}

impl FieldKey {
    /// Parses `name` or `group-member`
    ///
    /// # Errors
    /// Keys nesting deeper than one level are rejected with [`Error::InvalidKey`]
    pub fn parse(key: &str) -> Result<Self> {
        let mut parts = key.split('-');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, _) => Ok(Self::Simple(name.to_string())),
            (Some(group), Some(member), None) => {
                Ok(Self::Nested(group.to_string(), member.to_string()))
            }
            _ => Err(Error::InvalidKey(key.to_string())),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(name) => f.write_str(name),
            Self::Nested(group, member) => write!(f, "{group}-{member}"),
        }
    }
}

/// Keeps the entries whose field contains any of `filters` (`retain`) or none of
/// them (`!retain`). Matching is case-insensitive; entries without the field are
/// dropped either way.
pub(crate) fn filter(
    entries: Vec<Entry>,
    key: &FieldKey,
    filters: &[impl AsRef<str>],
    retain: bool,
) -> Vec<Entry> {
    let filters = filters
        .iter()
        .map(|f| f.as_ref().to_lowercase())
        .collect::<Vec<String>>();

    entries
        .into_iter()
        .filter(|entry| {
            let Some(value) = entry.field(key) else {
                return false;
            };
            let value = value.to_lowercase();
            let matched = filters.iter().any(|f| value.contains(f.as_str()));
            matched == retain
        })
        .collect()
}

/// Stable sort on the string form of a field. Entries without it sort as `""`.
pub(crate) fn sort(entries: &mut [Entry], key: &FieldKey, ascending: bool) {
    entries.sort_by(|a, b| {
        let ordering = a
            .field(key)
            .unwrap_or_default()
            .cmp(b.field(key).unwrap_or_default());
        if ascending { ordering } else { ordering.reverse() }
    });
}
