//! Baseline slot-partitioned index.
//!
//! Points live in per-slot buckets; a hybrid search prunes to the slots
//! overlapping the query range, scans them exactly (L2 squared), and keeps
//! the top-k through a bounded max-heap. Slots are scanned through rayon,
//! so the harness's pool size caps the index's internal parallelism.
//!
//! This is the simplest conformant collaborator for the pipelines: graph
//! construction parameters (`m`, `ef_construction`, `seed`) are carried in
//! the manifest for compatibility and reporting, but an exact scan has no
//! graph for them to steer.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{HarnessError, Result};
use crate::index::{IndexConfig, RangeIndex};
use crate::partition::SlotRange;

const INDEX_MAGIC: [u8; 4] = *b"RBIX";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SlotBucket {
    range: SlotRange,
    ids: Vec<u32>,
    attributes: Vec<i64>,
    /// Flattened row-major vector data, `ids.len() * dim` floats.
    vectors: Vec<f32>,
}

impl SlotBucket {
    fn with_capacity(range: SlotRange, points: usize, dim: usize) -> Self {
        Self {
            range,
            ids: Vec::with_capacity(points),
            attributes: Vec::with_capacity(points),
            vectors: Vec::with_capacity(points * dim),
        }
    }

    fn reserve(&mut self, points: usize, dim: usize) {
        self.ids.reserve(points);
        self.attributes.reserve(points);
        self.vectors.reserve(points * dim);
    }
}

/// Slot-bucketed exact-scan index implementing [`RangeIndex`].
#[derive(Debug, Serialize, Deserialize)]
pub struct SlottedIndex {
    config: IndexConfig,
    buckets: Vec<SlotBucket>,
    count: usize,
    #[serde(skip)]
    ef_search: usize,
    #[serde(skip)]
    read_only: bool,
}

#[derive(Debug, Clone, Copy)]
struct Neighbor {
    dist: f32,
    id: u32,
}

impl PartialEq for Neighbor {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on distance; ties broken by id for determinism.
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[inline]
fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

impl SlottedIndex {
    /// The configuration this index was built with.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Slot index a point with `attribute` belongs to: the first slot
    /// whose range contains it. Shared boundary values resolve to the
    /// lower slot. Out-of-domain attributes fall into the nearest end
    /// slot.
    fn slot_for(&self, attribute: i64) -> usize {
        self.buckets
            .iter()
            .position(|b| b.range.contains(attribute))
            .unwrap_or_else(|| {
                if self
                    .buckets
                    .first()
                    .is_some_and(|b| attribute < b.range.low)
                {
                    0
                } else {
                    self.buckets.len().saturating_sub(1)
                }
            })
    }

    fn scan_bucket(
        &self,
        bucket: &SlotBucket,
        query: &[f32],
        breadth: usize,
        low: i64,
        high: i64,
    ) -> BinaryHeap<Neighbor> {
        let dim = self.config.dim;
        let mut heap: BinaryHeap<Neighbor> = BinaryHeap::with_capacity(breadth + 1);

        for (i, (&id, &attribute)) in bucket.ids.iter().zip(bucket.attributes.iter()).enumerate() {
            if attribute < low || attribute > high {
                continue;
            }
            let vector = &bucket.vectors[i * dim..(i + 1) * dim];
            let dist = l2_distance_squared(query, vector);
            let candidate = Neighbor { dist, id };
            if heap.len() < breadth {
                heap.push(candidate);
            } else if let Some(worst) = heap.peek() {
                if candidate < *worst {
                    heap.pop();
                    heap.push(candidate);
                }
            }
        }

        heap
    }
}

impl RangeIndex for SlottedIndex {
    fn build(config: IndexConfig, capacity: usize) -> Self {
        let per_slot = capacity / config.slots.len().max(1) + 1;
        let buckets = config
            .slots
            .iter()
            .map(|&range| SlotBucket::with_capacity(range, per_slot, config.dim))
            .collect();
        Self {
            config,
            buckets,
            count: 0,
            ef_search: 0,
            read_only: false,
        }
    }

    fn insert(&mut self, vector: &[f32], id: u32, attribute: i64) -> Result<()> {
        if self.read_only {
            return Err(HarnessError::ReadOnly);
        }
        if vector.len() != self.config.dim {
            return Err(HarnessError::Dimension {
                expected: self.config.dim,
                actual: vector.len(),
            });
        }

        let slot = self.slot_for(attribute);
        let bucket = &mut self.buckets[slot];
        bucket.ids.push(id);
        bucket.attributes.push(attribute);
        bucket.vectors.extend_from_slice(vector);
        self.count += 1;
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        let io = |e| HarnessError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        let file = File::create(path).map_err(io)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&INDEX_MAGIC).map_err(io)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes()).map_err(io)?;
        bincode::serialize_into(&mut writer, self)
            .map_err(|e| HarnessError::Format(format!("encode failed: {e}")))?;
        writer.flush().map_err(io)?;
        Ok(())
    }

    fn load(path: &Path, read_only: bool, capacity_override: usize) -> Result<Self> {
        let io = |e| HarnessError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        let file = File::open(path).map_err(io)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(io)?;
        if magic != INDEX_MAGIC {
            return Err(HarnessError::Format(format!(
                "bad magic bytes {magic:?} in {}",
                path.display()
            )));
        }
        let mut version = [0u8; 4];
        reader.read_exact(&mut version).map_err(io)?;
        let version = u32::from_le_bytes(version);
        if version != FORMAT_VERSION {
            return Err(HarnessError::Format(format!(
                "unsupported format version {version}, expected {FORMAT_VERSION}"
            )));
        }

        let mut index: SlottedIndex = bincode::deserialize_from(&mut reader)
            .map_err(|e| HarnessError::Format(format!("decode failed: {e}")))?;
        index.read_only = read_only;

        // capacity_override of 0 means trust the element count on disk;
        // a larger value pre-reserves room for growth after load.
        if !read_only && capacity_override > index.count {
            let extra = (capacity_override - index.count) / index.buckets.len().max(1) + 1;
            let dim = index.config.dim;
            for bucket in &mut index.buckets {
                bucket.reserve(extra, dim);
            }
        }

        Ok(index)
    }

    fn set_search_breadth(&mut self, ef_search: usize) {
        self.ef_search = ef_search;
    }

    fn hybrid_search(&self, query: &[f32], k: usize, range: (i64, i64)) -> Vec<(u32, f32)> {
        let (low, high) = range;
        if k == 0 || low > high || query.len() != self.config.dim {
            return Vec::new();
        }

        // Candidate pool per slot is the configured search breadth,
        // never less than k.
        let breadth = self.ef_search.max(k);

        let touched: SmallVec<[usize; 8]> = self
            .buckets
            .iter()
            .enumerate()
            .filter(|(_, b)| b.range.overlaps(low, high))
            .map(|(i, _)| i)
            .collect();

        let per_slot: Vec<BinaryHeap<Neighbor>> = touched
            .as_slice()
            .par_iter()
            .map(|&slot| self.scan_bucket(&self.buckets[slot], query, breadth, low, high))
            .collect();

        let mut top: BinaryHeap<Neighbor> = BinaryHeap::with_capacity(k + 1);
        for heap in per_slot {
            for candidate in heap {
                if top.len() < k {
                    top.push(candidate);
                } else if let Some(worst) = top.peek() {
                    if candidate < *worst {
                        top.pop();
                        top.push(candidate);
                    }
                }
            }
        }

        top.into_sorted_vec()
            .into_iter()
            .map(|n| (n.id, n.dist))
            .collect()
    }

    fn element_count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::compute_slot_ranges;

    fn sample_index() -> SlottedIndex {
        // Attributes 0..100 across four slots, vectors on a line so
        // distances are easy to reason about.
        let attributes: Vec<i64> = (0..100).collect();
        let slots = compute_slot_ranges(&attributes, 4).unwrap();
        let config = IndexConfig {
            dim: 2,
            m: 8,
            ef_construction: 64,
            seed: 42,
            slots,
        };
        let mut index = SlottedIndex::build(config, 100);
        for i in 0..100u32 {
            index
                .insert(&[i as f32, 0.0], i, i as i64)
                .unwrap();
        }
        index
    }

    #[test]
    fn hybrid_search_respects_range_and_order() {
        let mut index = sample_index();
        index.set_search_breadth(32);

        let results = index.hybrid_search(&[50.0, 0.0], 5, (40, 60));
        let ids: Vec<u32> = results.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids.len(), 5);
        // Nearest in-range point first.
        assert_eq!(ids[0], 50);
        for &(id, _) in &results {
            assert!((40..=60).contains(&(id as i64)));
        }
        for pair in results.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn range_spanning_multiple_slots_matches_brute_force() {
        let index = sample_index();
        let query = [73.2, 0.0];
        let results = index.hybrid_search(&query, 10, (10, 90));
        let ids: Vec<u32> = results.iter().map(|&(id, _)| id).collect();

        let mut expected: Vec<(u32, f32)> = (10..=90u32)
            .map(|i| (i, (i as f32 - 73.2) * (i as f32 - 73.2)))
            .collect();
        expected.sort_by(|a, b| a.1.total_cmp(&b.1));
        let expected_ids: Vec<u32> = expected.iter().take(10).map(|&(id, _)| id).collect();
        assert_eq!(ids, expected_ids);
    }

    #[test]
    fn empty_range_returns_nothing() {
        let index = sample_index();
        assert!(index.hybrid_search(&[0.0, 0.0], 10, (500, 900)).is_empty());
        assert!(index.hybrid_search(&[0.0, 0.0], 10, (60, 40)).is_empty());
    }

    #[test]
    fn fewer_matches_than_k() {
        let index = sample_index();
        let results = index.hybrid_search(&[0.0, 0.0], 10, (3, 5));
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.index");

        let index = sample_index();
        index.save(&path).unwrap();

        let mut loaded = SlottedIndex::load(&path, true, 0).unwrap();
        assert_eq!(loaded.element_count(), 100);
        loaded.set_search_breadth(16);

        let before = index.hybrid_search(&[33.0, 0.0], 10, (0, 99));
        let after = loaded.hybrid_search(&[33.0, 0.0], 10, (0, 99));
        assert_eq!(before, after);
    }

    #[test]
    fn read_only_load_rejects_insert() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.index");
        sample_index().save(&path).unwrap();

        let mut loaded = SlottedIndex::load(&path, true, 0).unwrap();
        let err = loaded.insert(&[0.0, 0.0], 200, 5).unwrap_err();
        assert!(matches!(err, HarnessError::ReadOnly));
    }

    #[test]
    fn load_rejects_wrong_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.index");
        std::fs::write(&path, b"NOPE00000000").unwrap();

        let err = SlottedIndex::load(&path, true, 0).unwrap_err();
        assert!(matches!(err, HarnessError::Format(_)));
    }

    #[test]
    fn insert_rejects_wrong_dimension() {
        let mut index = sample_index();
        let err = index.insert(&[1.0, 2.0, 3.0], 500, 10).unwrap_err();
        assert!(matches!(
            err,
            HarnessError::Dimension {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn boundary_attribute_lands_in_lower_slot() {
        let index = sample_index();
        let boundary = index.buckets[0].range.high;
        let slot = index.slot_for(boundary);
        assert_eq!(slot, 0);
        // And the shared point is still found when querying the upper slot's span.
        let hit = index.hybrid_search(&[boundary as f32, 0.0], 1, (boundary, boundary));
        assert_eq!(hit[0].0 as i64, boundary);
    }

    #[test]
    fn search_breadth_does_not_change_results() {
        let mut index = sample_index();
        let narrow = index.hybrid_search(&[20.0, 0.0], 10, (0, 99));
        index.set_search_breadth(500);
        let wide = index.hybrid_search(&[20.0, 0.0], 10, (0, 99));
        assert_eq!(narrow, wide);
    }
}
