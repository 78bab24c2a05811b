//! The index contract consumed by the benchmark pipelines.
//!
//! The harness never looks inside the index: it constructs one with a slot
//! partition, inserts points, persists it, and issues range-filtered top-k
//! searches. Anything honoring [`RangeIndex`] can be benchmarked;
//! [`SlottedIndex`] is the baseline collaborator shipped with the harness.

pub mod slotted;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::partition::SlotRange;

pub use slotted::SlottedIndex;

/// Construction-time configuration for a slot-partitioned index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Vector dimensionality.
    pub dim: usize,
    /// Max links per slot (graph construction parameter).
    pub m: usize,
    /// Construction-time search breadth.
    pub ef_construction: usize,
    /// Seed for any construction-time randomness.
    pub seed: u64,
    /// The slot partition of the attribute domain.
    pub slots: Vec<SlotRange>,
}

/// A persisted, range-filterable ANN index.
///
/// Implementations must be safe to search from the harness's worker pool;
/// the pipelines cap that pool at one thread for the query phase.
pub trait RangeIndex: Send + Sync + Sized {
    /// Create an empty index configured for the given slot partition.
    /// `capacity` is the expected number of points.
    fn build(config: IndexConfig, capacity: usize) -> Self;

    /// Insert one point; `attribute` determines its slot membership.
    fn insert(&mut self, vector: &[f32], id: u32, attribute: i64) -> Result<()>;

    /// Persist the index to `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Load a previously saved index. `capacity_override` of 0 means
    /// auto-detect the element count from the file.
    fn load(path: &Path, read_only: bool, capacity_override: usize) -> Result<Self>;

    /// Configure query-time search breadth.
    fn set_search_breadth(&mut self, ef_search: usize);

    /// Up to `k` nearest ids with attribute in `[range.0, range.1]`,
    /// ordered by distance.
    fn hybrid_search(&self, query: &[f32], k: usize, range: (i64, i64)) -> Vec<(u32, f32)>;

    /// Number of indexed points.
    fn element_count(&self) -> usize;
}
