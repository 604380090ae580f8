//! In-memory feature store for points of interest.
//!
//! Entries are kept in insertion order alongside an index from the
//! case-folded name to the entry's position. Names are unique under
//! case-insensitive comparison: inserting a colliding name fails instead of
//! overwriting the existing record.

use std::collections::BTreeMap;

use atlas_types::PointOfInterest;

/// Default cap on search hits.
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// Errors returned by [`FeatureStore`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A point with the same name (ignoring case) already exists.
    #[error("a place named {existing:?} already exists")]
    DuplicateName {
        /// The stored name that collided.
        existing: String,
    },

    /// The name is empty after trimming.
    #[error("place name must not be empty")]
    EmptyName,

    /// No point is stored under the requested name.
    #[error("place not found: {0}")]
    NotFound(String),
}

/// Append-only collection of points of interest keyed by name.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    entries: Vec<PointOfInterest>,
    index: BTreeMap<String, usize>,
    max_results: usize,
}

impl FeatureStore {
    /// Create an empty store with the default search cap.
    pub const fn new() -> Self {
        Self::with_max_results(DEFAULT_MAX_RESULTS)
    }

    /// Create an empty store with a custom search cap.
    pub const fn with_max_results(max_results: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: BTreeMap::new(),
            max_results,
        }
    }

    /// Insert a point.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateName`] on a case-insensitive name
    /// collision, or [`StoreError::EmptyName`] for a blank name. The store
    /// is unchanged in both cases.
    pub fn insert(&mut self, poi: PointOfInterest) -> Result<(), StoreError> {
        let key = poi.key();
        if key.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if let Some(existing) = self.index.get(&key).and_then(|&i| self.entries.get(i)) {
            return Err(StoreError::DuplicateName {
                existing: existing.name.clone(),
            });
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(poi);
        Ok(())
    }

    /// Look up a point by name, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no point has that name.
    pub fn get(&self, name: &str) -> Result<&PointOfInterest, StoreError> {
        self.index
            .get(&name.trim().to_lowercase())
            .and_then(|&i| self.entries.get(i))
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))
    }

    /// Search by name.
    ///
    /// Case-insensitive substring match (which includes prefixes), in
    /// insertion order, at most `max_results` hits. A blank query matches
    /// nothing.
    pub fn find_by_prefix(&self, query: &str) -> Vec<&PointOfInterest> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|poi| poi.key().contains(&needle))
            .take(self.max_results)
            .collect()
    }

    /// Remove a point by name and return it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no point has that name.
    pub fn remove(&mut self, name: &str) -> Result<PointOfInterest, StoreError> {
        let key = name.trim().to_lowercase();
        let position = self
            .index
            .remove(&key)
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))?;
        if position >= self.entries.len() {
            return Err(StoreError::NotFound(name.to_owned()));
        }
        let removed = self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot = slot.saturating_sub(1);
            }
        }
        Ok(removed)
    }

    /// Iterate all points in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> {
        self.entries.iter()
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The configured search cap.
    pub const fn max_results(&self) -> usize {
        self.max_results
    }
}

impl Default for FeatureStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atlas_types::{Category, Coordinate};

    use super::*;

    fn poi(name: &str) -> PointOfInterest {
        PointOfInterest::new(name, Category::SouvenirShop, "", Coordinate::new(5.0, 5.0))
    }

    #[test]
    fn insert_and_get_ignore_case() {
        let mut store = FeatureStore::new();
        store.insert(poi("Toko Mochi Yenny")).unwrap();
        assert_eq!(store.get("toko mochi yenny").unwrap().name, "Toko Mochi Yenny");
        assert_eq!(store.get("  TOKO MOCHI YENNY ").unwrap().name, "Toko Mochi Yenny");
    }

    #[test]
    fn duplicate_name_with_different_case_is_refused() {
        let mut store = FeatureStore::new();
        store.insert(poi("Toko A")).unwrap();
        let err = store.insert(poi("toko a"));
        assert!(matches!(err, Err(StoreError::DuplicateName { existing }) if existing == "Toko A"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("TOKO A").unwrap().name, "Toko A");
    }

    #[test]
    fn blank_name_is_refused() {
        let mut store = FeatureStore::new();
        assert!(matches!(store.insert(poi("   ")), Err(StoreError::EmptyName)));
        assert!(store.is_empty());
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = FeatureStore::new();
        assert!(matches!(store.get("Sunda Rasa"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn search_is_capped_and_insertion_ordered() {
        let mut store = FeatureStore::new();
        for i in 0..12 {
            store.insert(poi(&format!("Mochi {i:02}"))).unwrap();
        }
        store.insert(poi("Dapur Roti")).unwrap();

        let hits: Vec<&str> = store
            .find_by_prefix("mochi")
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(hits.len(), DEFAULT_MAX_RESULTS);
        assert_eq!(hits.first(), Some(&"Mochi 00"));
        assert_eq!(hits.last(), Some(&"Mochi 07"));
    }

    #[test]
    fn search_matches_substrings_case_insensitively() {
        let mut store = FeatureStore::with_max_results(3);
        store.insert(poi("Kartika Sari Sukabumi")).unwrap();
        store.insert(poi("Toko Sindang Sari")).unwrap();
        store.insert(poi("Sunda Rasa")).unwrap();

        let hits: Vec<&str> = store
            .find_by_prefix("SARI")
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(hits, vec!["Kartika Sari Sukabumi", "Toko Sindang Sari"]);
        assert!(store.find_by_prefix("   ").is_empty());
        assert!(store.find_by_prefix("bakso").is_empty());
    }

    #[test]
    fn remove_reindexes_later_entries() {
        let mut store = FeatureStore::new();
        store.insert(poi("A")).unwrap();
        store.insert(poi("B")).unwrap();
        store.insert(poi("C")).unwrap();

        let removed = store.remove("b").unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("C").unwrap().name, "C");
        assert!(store.get("B").is_err());
        assert!(matches!(store.remove("B"), Err(StoreError::NotFound(_))));

        // The freed name can be used again.
        store.insert(poi("b")).unwrap();
        let names: Vec<&str> = store.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "b"]);
    }
}
