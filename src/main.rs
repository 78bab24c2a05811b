//! Command-line entry point for the benchmark harness.
//!
//! Two subcommands mirror the two benchmark phases. Stdout carries only
//! the machine-parseable summary lines; everything else (progress, slot
//! tables) goes to stderr through tracing.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use rangebench::bench::{build, search, BuildParams, SearchParams};
use rangebench::error::{HarnessError, Result};
use rangebench::monitor;
use rangebench::SlottedIndex;

#[derive(Parser)]
#[command(name = "rangebench")]
#[command(about = "Benchmark harness for range-filtered ANN search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a slot-partitioned index from vectors and attributes
    Build {
        /// Input vectors in .bin format
        data: PathBuf,
        /// One integer attribute per line, same order as the vectors
        attributes: PathBuf,
        /// Path to save the index
        output_index: PathBuf,
        /// Max links per slot
        m: usize,
        /// Construction-time search breadth
        ef_construction: usize,
        /// Number of slots for partitioning
        num_slots: usize,
        /// Random seed for index construction
        random_seed: u64,
    },
    /// Run range-filtered queries against a built index
    Search {
        /// Query vectors in .fvecs format
        #[arg(long = "query_path")]
        query_path: PathBuf,
        /// Query ranges, one low-high pair per line
        #[arg(long = "query_ranges_file")]
        query_ranges_file: PathBuf,
        /// Groundtruth in .ivecs format
        #[arg(long = "groundtruth_file")]
        groundtruth_file: PathBuf,
        /// Path to the saved index
        #[arg(long = "index_file")]
        index_file: PathBuf,
        /// Query-time search breadth
        #[arg(long = "ef_search")]
        ef_search: i64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    // The surrounding automation expects exit code 1 on usage errors,
    // not clap's default 2.
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        let _ = err.print();
        process::exit(1);
    });

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            data,
            attributes,
            output_index,
            m,
            ef_construction,
            num_slots,
            random_seed,
        } => {
            if m == 0 || ef_construction == 0 || num_slots == 0 {
                return Err(HarnessError::Usage(
                    "M, ef_construction and num_slots must be positive integers".into(),
                ));
            }
            let params = BuildParams {
                data,
                attributes,
                output: output_index,
                m,
                ef_construction,
                num_slots,
                seed: random_seed,
            };
            let report = build::run::<SlottedIndex>(&params)?;

            println!("BUILD_TIME_SECONDS: {}", report.build_seconds);
            println!("PEAK_THREADS: {}", report.peak_threads);
            monitor::print_peak_memory();
            Ok(())
        }
        Command::Search {
            query_path,
            query_ranges_file,
            groundtruth_file,
            index_file,
            ef_search,
        } => {
            if ef_search <= 0 {
                return Err(HarnessError::Usage(
                    "ef_search must be a positive integer".into(),
                ));
            }
            let params = SearchParams {
                queries: query_path,
                ranges: query_ranges_file,
                groundtruth: groundtruth_file,
                index: index_file,
                ef_search: ef_search as usize,
            };
            let report = search::run::<SlottedIndex>(&params)?;

            println!("Query time (s): {}", report.query_seconds);
            println!("Peak thread count: {}", report.peak_threads);
            println!("QPS: {}", report.qps);
            println!("Recall: {}", report.recall);
            monitor::print_peak_memory();
            Ok(())
        }
    }
}
