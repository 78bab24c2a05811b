//! Equal-frequency partitioning of the attribute domain into slots.
//!
//! The index accelerates range-filtered search by bucketing points into
//! contiguous attribute sub-ranges ("slots"). Partitioning by rank rather
//! than by width keeps per-slot population roughly uniform under skewed
//! attribute distributions, so a query range touches a predictable number
//! of candidates regardless of where it lands in the domain.

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// One contiguous bucket of the attribute domain, bounds inclusive.
///
/// Adjacent slots share their boundary value: `slot[i].high ==
/// slot[i + 1].low`. The shared point belongs to both ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub low: i64,
    pub high: i64,
}

impl SlotRange {
    pub fn contains(&self, value: i64) -> bool {
        self.low <= value && value <= self.high
    }

    /// True when `[low, high]` intersects this slot.
    pub fn overlaps(&self, low: i64, high: i64) -> bool {
        self.low <= high && low <= self.high
    }
}

/// Partition `values` into `num_slots` equal-frequency slots.
///
/// Internal boundaries sit at the `i/num_slots` percentiles of the sorted
/// values, linearly interpolated between neighboring ranks. Interpolated
/// boundaries are truncated to integers with a plain cast; callers that
/// persist slot tables rely on this being stable, so it must not be
/// changed to rounding. `num_slots >= 1` is a caller contract.
///
/// Returns [`HarnessError::EmptyAttributes`] when `values` is empty.
pub fn compute_slot_ranges(values: &[i64], num_slots: usize) -> Result<Vec<SlotRange>> {
    if values.is_empty() {
        return Err(HarnessError::EmptyAttributes);
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let n = sorted.len();

    let step = 100.0 / num_slots as f64;
    let mut boundaries = Vec::with_capacity(num_slots.saturating_sub(1));
    for i in 1..num_slots {
        let percentile = step * i as f64;
        let pos = percentile / 100.0 * (n - 1) as f64;
        let lower = pos.floor() as usize;
        let upper = pos.ceil() as usize;

        let value = if lower == upper {
            sorted[lower]
        } else {
            let frac = pos - lower as f64;
            (sorted[lower] as f64 * (1.0 - frac) + sorted[upper] as f64 * frac) as i64
        };
        boundaries.push(value);
    }

    let min_val = sorted[0];
    let max_val = sorted[n - 1];

    let mut slots = Vec::with_capacity(num_slots);
    for i in 0..num_slots {
        let low = if i == 0 { min_val } else { boundaries[i - 1] };
        let high = if i == num_slots - 1 {
            max_val
        } else {
            boundaries[i]
        };
        slots.push(SlotRange { low, high });
    }

    Ok(slots)
}
