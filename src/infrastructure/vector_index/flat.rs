//! Exact flat index using brute-force squared L2 distance

use std::collections::{HashMap, HashSet};
use std::path::Path;

use super::file;
use crate::domain::cache_entry::CacheEntryId;
use crate::domain::vector_index::{Neighbor, VectorIndex};
use crate::domain::DomainError;

/// Flat index with id mapping.
///
/// Vectors live in one contiguous buffer; slot `i` holds `ids[i]`.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    ids: Vec<CacheEntryId>,
    vectors: Vec<f32>,
    slots: HashMap<CacheEntryId, usize>,
}

impl FlatIndex {
    /// Create an empty index
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            ids: Vec::new(),
            vectors: Vec::new(),
            slots: HashMap::new(),
        }
    }

    fn check_vector(&self, vector: &[f32]) -> Result<(), DomainError> {
        if vector.len() != self.dimensions {
            return Err(DomainError::invalid_argument(format!(
                "Vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }

        if vector.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::invalid_argument(
                "Vector contains non-finite components",
            ));
        }

        Ok(())
    }

    fn vector_at(&self, slot: usize) -> &[f32] {
        let start = slot * self.dimensions;
        &self.vectors[start..start + self.dimensions]
    }

    fn clear(&mut self) {
        self.ids.clear();
        self.vectors.clear();
        self.slots.clear();
    }

    fn push(&mut self, id: CacheEntryId, vector: &[f32]) {
        self.slots.insert(id, self.ids.len());
        self.ids.push(id);
        self.vectors.extend_from_slice(vector);
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl VectorIndex for FlatIndex {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn count(&self) -> usize {
        self.ids.len()
    }

    fn ids(&self) -> Vec<CacheEntryId> {
        let mut ids = self.ids.clone();
        ids.sort();
        ids
    }

    fn add(&mut self, id: CacheEntryId, vector: &[f32]) -> Result<(), DomainError> {
        self.check_vector(vector)?;

        match self.slots.get(&id) {
            Some(&slot) => {
                let start = slot * self.dimensions;
                self.vectors[start..start + self.dimensions].copy_from_slice(vector);
            }
            None => self.push(id, vector),
        }

        Ok(())
    }

    fn remove(&mut self, id: CacheEntryId) -> bool {
        let Some(slot) = self.slots.remove(&id) else {
            return false;
        };

        let last = self.ids.len() - 1;

        if slot != last {
            let moved = self.ids[last];
            self.ids.swap(slot, last);

            let (head, tail) = self.vectors.split_at_mut(last * self.dimensions);
            head[slot * self.dimensions..(slot + 1) * self.dimensions]
                .copy_from_slice(&tail[..self.dimensions]);

            self.slots.insert(moved, slot);
        }

        self.ids.truncate(last);
        self.vectors.truncate(last * self.dimensions);

        true
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, DomainError> {
        self.check_vector(query)?;

        let mut neighbors: Vec<Neighbor> = self
            .ids
            .iter()
            .enumerate()
            .map(|(slot, id)| Neighbor::new(*id, squared_l2(query, self.vector_at(slot))))
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }

    fn rebuild(&mut self, pairs: Vec<(CacheEntryId, Vec<f32>)>) -> Result<(), DomainError> {
        let mut seen = HashSet::with_capacity(pairs.len());

        for (id, vector) in &pairs {
            self.check_vector(vector)?;

            if !seen.insert(*id) {
                return Err(DomainError::invalid_argument(format!(
                    "Duplicate vector id {} in rebuild",
                    id
                )));
            }
        }

        self.clear();
        self.ids.reserve(pairs.len());
        self.vectors.reserve(pairs.len() * self.dimensions);

        for (id, vector) in &pairs {
            self.push(*id, vector);
        }

        Ok(())
    }

    fn save(&self, path: &Path) -> Result<(), DomainError> {
        let records = self
            .ids
            .iter()
            .enumerate()
            .map(|(slot, id)| (*id, self.vector_at(slot)));

        file::write(path, self.dimensions, records)?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<(), DomainError> {
        let records = file::read(path, self.dimensions)?;
        self.rebuild(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: i64) -> CacheEntryId {
        CacheEntryId::new(value)
    }

    fn sample_index() -> FlatIndex {
        let mut index = FlatIndex::new(2);
        index.add(id(1), &[1.0, 0.0]).unwrap();
        index.add(id(2), &[0.0, 1.0]).unwrap();
        index.add(id(3), &[0.8, 0.6]).unwrap();
        index
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = sample_index();
        let results = index.search(&[1.0, 0.0], 3).unwrap();

        let ids: Vec<i64> = results.iter().map(|n| n.id.value()).collect();
        assert_eq!(ids, vec![1, 3, 2]);
        assert_eq!(results[0].distance, 0.0);
        assert!((results[2].distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_truncates_to_k() {
        let index = sample_index();
        assert_eq!(index.search(&[1.0, 0.0], 2).unwrap().len(), 2);
        assert_eq!(index.search(&[1.0, 0.0], 10).unwrap().len(), 3);
    }

    #[test]
    fn test_search_empty_index() {
        let index = FlatIndex::new(2);
        assert!(index.search(&[1.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_equal_distances_tie_break_by_id() {
        let mut index = FlatIndex::new(2);
        index.add(id(7), &[0.0, 1.0]).unwrap();
        index.add(id(5), &[0.0, -1.0]).unwrap();

        let results = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results[0].id, id(5));
        assert_eq!(results[1].id, id(7));
    }

    #[test]
    fn test_add_existing_id_replaces_vector() {
        let mut index = sample_index();
        index.add(id(2), &[1.0, 0.0]).unwrap();

        assert_eq!(index.count(), 3);
        let results = index.search(&[1.0, 0.0], 2).unwrap();
        assert!(results.iter().all(|n| n.distance == 0.0));
    }

    #[test]
    fn test_add_rejects_wrong_dimensions() {
        let mut index = FlatIndex::new(2);
        let err = index.add(id(1), &[1.0, 0.0, 0.0]).unwrap_err();

        assert!(matches!(err, DomainError::InvalidArgument { .. }));
        assert_eq!(index.count(), 0);
    }

    #[test]
    fn test_add_rejects_nan() {
        let mut index = FlatIndex::new(2);
        assert!(index.add(id(1), &[f32::NAN, 0.0]).is_err());
    }

    #[test]
    fn test_remove_keeps_other_vectors_addressable() {
        let mut index = sample_index();

        assert!(index.remove(id(1)));
        assert!(!index.remove(id(1)));
        assert_eq!(index.ids(), vec![id(2), id(3)]);

        let nearest = index.search(&[0.8, 0.6], 1).unwrap();
        assert_eq!(nearest[0].id, id(3));
        assert_eq!(nearest[0].distance, 0.0);
    }

    #[test]
    fn test_remove_last_slot() {
        let mut index = sample_index();

        assert!(index.remove(id(3)));
        assert_eq!(index.ids(), vec![id(1), id(2)]);
    }

    #[test]
    fn test_rebuild_replaces_content() {
        let mut index = sample_index();
        index
            .rebuild(vec![(id(10), vec![0.0, 1.0]), (id(11), vec![1.0, 0.0])])
            .unwrap();

        assert_eq!(index.ids(), vec![id(10), id(11)]);
    }

    #[test]
    fn test_rebuild_rejects_duplicates_without_touching_content() {
        let mut index = sample_index();
        let result = index.rebuild(vec![(id(10), vec![0.0, 1.0]), (id(10), vec![1.0, 0.0])]);

        assert!(result.is_err());
        assert_eq!(index.count(), 3);
    }

    #[test]
    fn test_save_then_load_gives_same_search_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.index");
        let index = sample_index();
        index.save(&path).unwrap();

        let mut loaded = FlatIndex::new(2);
        loaded.load(&path).unwrap();

        assert_eq!(loaded.ids(), index.ids());
        assert_eq!(
            loaded.search(&[0.5, 0.5], 3).unwrap(),
            index.search(&[0.5, 0.5], 3).unwrap()
        );
    }

    #[test]
    fn test_load_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.index");
        std::fs::write(&path, b"not an index").unwrap();

        let mut index = FlatIndex::new(2);
        let err = index.load(&path).unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
    }
}
