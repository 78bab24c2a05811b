//! Index construction pipeline.

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::dataset;
use crate::error::{HarnessError, Result};
use crate::index::{IndexConfig, RangeIndex};
use crate::monitor::{ResourceMonitor, SAMPLE_INTERVAL};
use crate::partition::compute_slot_ranges;

/// Inputs and construction parameters for a build run.
#[derive(Debug, Clone)]
pub struct BuildParams {
    pub data: PathBuf,
    pub attributes: PathBuf,
    pub output: PathBuf,
    pub m: usize,
    pub ef_construction: usize,
    pub num_slots: usize,
    pub seed: u64,
}

/// Measurements from a completed build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub build_seconds: f64,
    pub peak_threads: usize,
    pub num_points: usize,
    pub dim: usize,
}

/// Build and persist an index.
///
/// Loading, validation, and slot partitioning happen before the timer
/// starts. The timed region covers index construction, the insertion loop
/// (one call per point, input order), and the save; the resource monitor
/// runs for exactly that span. Downstream comparisons assume build time
/// excludes I/O-bound preprocessing, so the boundary must stay put.
pub fn run<I: RangeIndex>(params: &BuildParams) -> Result<BuildReport> {
    let data = dataset::read_bin(&params.data)?;
    info!(
        points = data.len(),
        dim = data.dim,
        "loaded vector dataset from {}",
        params.data.display()
    );

    let attributes = dataset::read_attributes(&params.attributes)?;
    if attributes.len() != data.len() {
        return Err(HarnessError::CountMismatch {
            what: "vectors/attributes",
            left: data.len(),
            right: attributes.len(),
        });
    }
    info!(count = attributes.len(), "loaded attribute values");

    let slots = compute_slot_ranges(&attributes, params.num_slots)?;
    for (i, slot) in slots.iter().enumerate() {
        info!(slot = i, low = slot.low, high = slot.high, "slot range");
    }

    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| HarnessError::Other(format!("worker pool: {e}")))?;
    info!(
        workers,
        m = params.m,
        ef_construction = params.ef_construction,
        num_slots = params.num_slots,
        seed = params.seed,
        "starting index construction"
    );

    let config = IndexConfig {
        dim: data.dim,
        m: params.m,
        ef_construction: params.ef_construction,
        seed: params.seed,
        slots,
    };
    let num_points = data.len();
    let dim = data.dim;

    let monitor = ResourceMonitor::start(SAMPLE_INTERVAL);
    let timer = Instant::now();

    let built: Result<()> = pool.install(|| {
        let mut index = I::build(config, num_points);
        for (i, (vector, &attribute)) in
            data.vectors.iter().zip(attributes.iter()).enumerate()
        {
            index.insert(vector, i as u32, attribute)?;
            if (i + 1) % 10_000 == 0 {
                info!("inserted {} / {} points", i + 1, num_points);
            }
        }
        index.save(&params.output)
    });

    let build_seconds = timer.elapsed().as_secs_f64();
    let peak_threads = monitor.stop();
    built?;

    info!(
        build_seconds,
        peak_threads,
        "index saved to {}",
        params.output.display()
    );

    Ok(BuildReport {
        build_seconds,
        peak_threads,
        num_points,
        dim,
    })
}
