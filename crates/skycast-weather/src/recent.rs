//! Most-recently-used list of places the user looked up, persisted as JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{place_query, LocationSuggestion, NormalizedLocation};

pub const DEFAULT_CAPACITY: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub name: String,
    pub region: String,
    pub country: String,
    pub timestamp: DateTime<Utc>,
}

impl RecentSearch {
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        country: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            country: country.into(),
            timestamp,
        }
    }

    /// Query string that looks this place up again
    pub fn to_query(&self) -> String {
        place_query(&self.name, &self.region, &self.country)
    }

    fn same_place(&self, other: &RecentSearch) -> bool {
        self.name == other.name && self.region == other.region && self.country == other.country
    }
}

impl From<&NormalizedLocation> for RecentSearch {
    fn from(location: &NormalizedLocation) -> Self {
        Self::new(
            location.name.clone(),
            location.region.clone(),
            location.country.clone(),
            Utc::now(),
        )
    }
}

impl From<&LocationSuggestion> for RecentSearch {
    fn from(s: &LocationSuggestion) -> Self {
        Self::new(s.name.clone(), s.region.clone(), s.country.clone(), Utc::now())
    }
}

/// Bounded list, newest first, one entry per place
#[derive(Debug, Clone, PartialEq)]
pub struct RecentSearches {
    capacity: usize,
    entries: Vec<RecentSearch>,
}

impl RecentSearches {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::new(),
        }
    }

    fn from_entries(capacity: usize, mut entries: Vec<RecentSearch>) -> Self {
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let mut list = Self::new(capacity);
        for entry in entries {
            if !list.entries.iter().any(|e| e.same_place(&entry)) {
                list.entries.push(entry);
            }
        }
        list.entries.truncate(capacity);
        list
    }

    /// Move `search` to the front, replacing any earlier entry for the same
    /// place, and drop the oldest entries beyond capacity.
    pub fn add(&mut self, search: RecentSearch) {
        self.entries.retain(|e| !e.same_place(&search));
        self.entries.insert(0, search);
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[RecentSearch] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentSearches {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// JSON file holding a [`RecentSearches`] list
#[derive(Debug, Clone)]
pub struct RecentSearchStore {
    path: PathBuf,
    capacity: usize,
}

impl RecentSearchStore {
    pub fn new(path: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            path: path.into(),
            capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored list. A missing or unreadable file yields an empty
    /// list; the history is not worth failing over.
    pub fn load(&self) -> RecentSearches {
        if !self.path.exists() {
            return RecentSearches::new(self.capacity);
        }

        let parsed = fs::read_to_string(&self.path)
            .context("Failed to read recent searches")
            .and_then(|json| {
                serde_json::from_str::<Vec<RecentSearch>>(&json)
                    .context("Failed to parse recent searches")
            });

        match parsed {
            Ok(entries) => RecentSearches::from_entries(self.capacity, entries),
            Err(e) => {
                tracing::warn!("Ignoring recent searches at {:?}: {:#}", self.path, e);
                RecentSearches::new(self.capacity)
            }
        }
    }

    pub fn save(&self, searches: &RecentSearches) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create recent searches directory")?;
        }

        let json = serde_json::to_string_pretty(searches.entries())
            .context("Failed to serialize recent searches")?;
        fs::write(&self.path, json).context("Failed to write recent searches")?;

        tracing::debug!("Saved {} recent searches to {:?}", searches.len(), self.path);
        Ok(())
    }

    /// Load, add `search`, save
    pub fn record(&self, search: RecentSearch) -> Result<RecentSearches> {
        let mut searches = self.load();
        searches.add(search);
        self.save(&searches)?;
        Ok(searches)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to delete recent searches")?;
            tracing::info!("Cleared recent searches");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn search(name: &str, minutes: i64) -> RecentSearch {
        RecentSearch::new(name, "", "Somewhere", at(minutes))
    }

    #[test]
    fn test_newest_first_and_capped() {
        let mut list = RecentSearches::new(3);
        for (i, name) in ["A", "B", "C", "D"].iter().enumerate() {
            list.add(search(name, i as i64));
        }
        let names: Vec<_> = list.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["D", "C", "B"]);
    }

    #[test]
    fn test_repeat_moves_to_front() {
        let mut list = RecentSearches::new(5);
        list.add(search("Oslo", 0));
        list.add(search("Paris", 1));
        list.add(search("Oslo", 2));

        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].name, "Oslo");
        assert_eq!(list.entries()[0].timestamp, at(2));
    }

    #[test]
    fn test_same_name_different_region_kept() {
        let mut list = RecentSearches::new(5);
        list.add(RecentSearch::new("London", "Ontario", "Canada", at(0)));
        list.add(RecentSearch::new("London", "City of London", "United Kingdom", at(1)));
        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[1].to_query(), "London, Ontario, Canada");
    }

    #[test]
    fn test_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentSearchStore::new(dir.path().join("nested").join("recent.json"), 5);

        store.record(search("Oslo", 0)).unwrap();
        store.record(search("Paris", 1)).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.entries()[0].name, "Paris");
    }

    #[test]
    fn test_store_missing_or_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentSearchStore::new(dir.path().join("recent.json"), 5);
        assert!(store.load().is_empty());

        fs::write(store.path(), "not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_store_applies_capacity_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.json");
        let entries: Vec<_> = (0..8).map(|i| search(&format!("P{}", i), i)).collect();
        fs::write(&path, serde_json::to_string(&entries).unwrap()).unwrap();

        let loaded = RecentSearchStore::new(&path, 3).load();
        let names: Vec<_> = loaded.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["P7", "P6", "P5"]);
    }

    #[test]
    fn test_store_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecentSearchStore::new(dir.path().join("recent.json"), 5);
        store.record(search("Oslo", 0)).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_empty());
        store.clear().unwrap();
    }
}
