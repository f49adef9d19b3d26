use std::path::Path;

use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{info, warn};

use crate::{
    entry::Entry,
    error::Result,
    export,
    query::{self, FieldKey},
};

/// The outcome of a parse: a working set that filters and sorts reshape, and the
/// untouched snapshot [`Playlist::reset_operations`] restores from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    entries: Vec<Entry>,
    backup: Vec<Entry>,
}

impl Playlist {
    #[must_use]
    pub fn new(entries: Vec<Entry>) -> Self {
        Self {
            backup: entries.clone(),
            entries,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keeps entries whose `key` contains any of `filters` when `retain` is set,
    /// or entries containing none of them otherwise. Matching ignores case.
    ///
    /// `key` is a field name (`category`) or a group member (`tvg-id`). Entries
    /// without the field are dropped in both modes.
    pub fn filter_by(&mut self, key: &str, filters: &[impl AsRef<str>], retain: bool) {
        if filters.is_empty() {
            warn!("Filter word/s missing, nothing to filter by");
            return;
        }
        if self.entries.is_empty() {
            return;
        }
        let key = match FieldKey::parse(key) {
            Ok(k) => k,
            Err(e) => {
                warn!("{e}");
                return;
            }
        };

        let before = self.entries.len();
        self.entries = query::filter(std::mem::take(&mut self.entries), &key, filters, retain);
        info!(
            "Filtering by {key} kept {} of {before} entries",
            self.entries.len()
        );
    }

    /// Stable sort on the string value of `key`.
    ///
    /// Only the first entry is checked for the field: when it lacks it, nothing
    /// is sorted even if later entries have it.
    pub fn sort_by(&mut self, key: &str, ascending: bool) {
        let Some(first) = self.entries.first() else {
            return;
        };
        let key = match FieldKey::parse(key) {
            Ok(k) => k,
            Err(e) => {
                warn!("{e}");
                return;
            }
        };
        if first.field(&key).is_none() {
            warn!("First entry has no {key} field, not sorting");
            return;
        }

        query::sort(&mut self.entries, &key, ascending);
    }

    /// Drops every filter and sort applied since parsing
    pub fn reset_operations(&mut self) {
        self.entries.clone_from(&self.backup);
    }

    pub fn retrieve_by_extension(&mut self, extensions: &[impl AsRef<str>]) {
        self.filter_by("url", extensions, true);
    }

    pub fn remove_by_extension(&mut self, extensions: &[impl AsRef<str>]) {
        self.filter_by("url", extensions, false);
    }

    pub fn retrieve_by_category(&mut self, categories: &[impl AsRef<str>]) {
        self.filter_by("category", categories, true);
    }

    pub fn remove_by_category(&mut self, categories: &[impl AsRef<str>]) {
        self.filter_by("category", categories, false);
    }

    /// Picks a random entry, shuffling the working set first when `shuffle` is set
    pub fn random_entry(&mut self, shuffle: bool) -> Option<&Entry> {
        let mut rng = rand::rng();
        if shuffle {
            self.entries.shuffle(&mut rng);
        }
        self.entries.choose(&mut rng)
    }

    /// # Errors
    /// Errors when an entry cannot be serialized
    pub fn to_json(&self) -> Result<String> {
        export::to_json(&self.entries)
    }

    #[must_use]
    pub fn to_m3u(&self) -> String {
        export::to_m3u(&self.entries)
    }

    /// Writes the working set to `path`, as JSON or M3U depending on its extension
    ///
    /// # Errors
    /// Errors on unknown extensions and on write failures
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        export::save_to_file(&self.entries, path.as_ref()).await
    }
}
