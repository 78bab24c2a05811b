//! Query execution pipeline.

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::bench::recall::micro_averaged_recall;
use crate::bench::QUERY_K;
use crate::dataset;
use crate::error::{HarnessError, Result};
use crate::index::RangeIndex;
use crate::monitor::{ResourceMonitor, SAMPLE_INTERVAL};

/// Inputs for a query run.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub queries: PathBuf,
    pub ranges: PathBuf,
    pub groundtruth: PathBuf,
    pub index: PathBuf,
    pub ef_search: usize,
}

/// Measurements from a completed query run.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub query_seconds: f64,
    pub peak_threads: usize,
    pub qps: f64,
    pub recall: f64,
    pub num_queries: usize,
}

/// Execute range-filtered queries against a persisted index.
///
/// Queries run one at a time, in input order, on a single worker thread;
/// this measures single-query serving latency rather than batch
/// throughput. Only the query loop is timed. Distances are discarded:
/// recall is the scored property, so only the returned id sets are kept.
pub fn run<I: RangeIndex>(params: &SearchParams) -> Result<SearchReport> {
    let queries = dataset::read_fvecs(&params.queries)?;
    info!(
        count = queries.len(),
        dim = queries.dim,
        "loaded queries from {}",
        params.queries.display()
    );

    let ranges = dataset::read_ranges(&params.ranges)?;
    if ranges.len() != queries.len() {
        return Err(HarnessError::CountMismatch {
            what: "queries/ranges",
            left: queries.len(),
            right: ranges.len(),
        });
    }

    let groundtruth = dataset::read_ivecs(&params.groundtruth)?;
    if groundtruth.len() != queries.len() {
        return Err(HarnessError::CountMismatch {
            what: "queries/groundtruth",
            left: queries.len(),
            right: groundtruth.len(),
        });
    }

    let mut index = I::load(&params.index, true, 0)?;
    info!(
        elements = index.element_count(),
        ef_search = params.ef_search,
        "index loaded from {}",
        params.index.display()
    );
    index.set_search_breadth(params.ef_search);

    // Force the index's internal parallelism down to one worker.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .map_err(|e| HarnessError::Other(format!("worker pool: {e}")))?;

    let num_queries = queries.len();
    let mut results: Vec<Vec<u32>> = Vec::with_capacity(num_queries);

    let monitor = ResourceMonitor::start(SAMPLE_INTERVAL);
    let timer = Instant::now();

    pool.install(|| {
        for (i, (query, &(low, high))) in
            queries.vectors.iter().zip(ranges.iter()).enumerate()
        {
            let found = index.hybrid_search(query, QUERY_K, (low, high));
            results.push(found.into_iter().map(|(id, _)| id).collect());
            if (i + 1) % 1_000 == 0 {
                info!("processed {} / {} queries", i + 1, num_queries);
            }
        }
    });

    let query_seconds = timer.elapsed().as_secs_f64();
    let peak_threads = monitor.stop();

    let recall = micro_averaged_recall(&results, &groundtruth, QUERY_K);
    let qps = if query_seconds > 0.0 {
        num_queries as f64 / query_seconds
    } else {
        0.0
    };

    Ok(SearchReport {
        query_seconds,
        peak_threads,
        qps,
        recall,
        num_queries,
    })
}
