use std::collections::HashMap;
use std::path::Path;

use tracing::info;

use crate::domain::ImageRecord;

/// Key → ordered, duplicate-free list of record ordinals.
///
/// Ordinals are positions in the index's record list, which is walk order,
/// so every list is ascending.
#[derive(Debug, Default)]
pub struct KeyTable {
    entries: HashMap<String, Vec<usize>>,
}

impl KeyTable {
    fn insert(&mut self, key: String, ordinal: usize) {
        let list = self.entries.entry(key).or_default();
        if !list.contains(&ordinal) {
            list.push(ordinal);
        }
    }

    /// Ordinals registered under `key` (already normalized).
    pub fn get(&self, key: &str) -> &[usize] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// Images found directly inside one folder name.
#[derive(Debug, Clone)]
pub struct FolderEntry {
    /// Lowercased folder name.
    pub name: String,
    pub ordinals: Vec<usize>,
}

/// Lowercased folder name → images, folders kept in first-seen walk order.
/// Distinct directories sharing a name are merged under one entry.
#[derive(Debug, Default)]
pub struct FolderIndex {
    entries: Vec<FolderEntry>,
    positions: HashMap<String, usize>,
}

impl FolderIndex {
    fn insert(&mut self, name: String, ordinal: usize) {
        let pos = match self.positions.get(&name) {
            Some(&pos) => pos,
            None => {
                self.entries.push(FolderEntry {
                    name: name.clone(),
                    ordinals: Vec::new(),
                });
                self.positions.insert(name, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[pos].ordinals.push(ordinal);
    }

    pub fn get(&self, name: &str) -> Option<&FolderEntry> {
        self.positions
            .get(&name.to_lowercase())
            .map(|&pos| &self.entries[pos])
    }

    /// Folders in walk order.
    pub fn iter(&self) -> impl Iterator<Item = &FolderEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Immutable multi-keyed lookup over a scanned image tree.
///
/// Every image is registered under its upper-cased filename stem, and under
/// the first two and first three hyphen-separated parts of that stem when the
/// stem has that many parts. `SR-CLE-W-2.jpg` is therefore reachable by
/// `SR-CLE-W-2`, `SR-CLE` and `SR-CLE-W`.
#[derive(Debug, Default)]
pub struct ImageIndex {
    records: Vec<ImageRecord>,
    full_stem: KeyTable,
    two_part: KeyTable,
    three_part: KeyTable,
    folders: FolderIndex,
}

impl ImageIndex {
    /// Build the index from records in walk order.
    pub fn build(records: Vec<ImageRecord>) -> Self {
        let mut index = Self {
            records,
            ..Self::default()
        };

        for (ordinal, record) in index.records.iter().enumerate() {
            index
                .folders
                .insert(record.folder_name.to_lowercase(), ordinal);

            let stem = filename_stem(&record.filename).to_uppercase();
            let parts: Vec<&str> = stem.split('-').collect();

            if parts.len() >= 2 {
                index.two_part.insert(parts[..2].join("-"), ordinal);
            }
            if parts.len() >= 3 {
                index.three_part.insert(parts[..3].join("-"), ordinal);
            }
            index.full_stem.insert(stem, ordinal);
        }

        info!(
            images = index.records.len(),
            keys = index.key_count(),
            folders = index.folders.len(),
            "image index built"
        );

        index
    }

    /// All URLs registered under `key` in any of the three key tables,
    /// in walk order without duplicates. The key is upper-cased first.
    pub fn lookup(&self, key: &str) -> Vec<&str> {
        let key = key.trim().to_uppercase();
        let mut ordinals: Vec<usize> = self
            .full_stem
            .get(&key)
            .iter()
            .chain(self.two_part.get(&key))
            .chain(self.three_part.get(&key))
            .copied()
            .collect();
        ordinals.sort_unstable();
        ordinals.dedup();

        let mut urls: Vec<&str> = Vec::with_capacity(ordinals.len());
        for url in self.urls_of(&ordinals) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }

    /// True when `key` is present in any key table.
    pub fn contains_key(&self, key: &str) -> bool {
        !self.lookup(key).is_empty()
    }

    pub fn full_stem(&self) -> &KeyTable {
        &self.full_stem
    }

    pub fn two_part(&self) -> &KeyTable {
        &self.two_part
    }

    pub fn three_part(&self) -> &KeyTable {
        &self.three_part
    }

    pub fn folders(&self) -> &FolderIndex {
        &self.folders
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    /// Resolve ordinals to URLs, preserving order.
    pub fn urls_of(&self, ordinals: &[usize]) -> Vec<&str> {
        ordinals
            .iter()
            .filter_map(|&i| self.records.get(i))
            .map(|r| r.url.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of distinct lookup keys across the three key tables.
    pub fn key_count(&self) -> usize {
        let mut keys: Vec<&str> = self
            .full_stem
            .keys()
            .chain(self.two_part.keys())
            .chain(self.three_part.keys())
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }
}

/// Filename without its final extension.
fn filename_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}
