//! Resource monitoring for timed benchmark phases.
//!
//! A [`ResourceMonitor`] samples the process's live thread count in a
//! background thread and keeps the maximum seen. It is owned by the
//! pipeline that measures a phase: started just before the timed region,
//! signalled and joined right after. The sampling interval is coarse
//! enough not to perturb the measured phase.
//!
//! Peak memory is a point-in-time read of the kernel's high-water marks,
//! taken once after a phase completes.

#[cfg(target_os = "linux")]
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default sampling interval for thread-count monitoring.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(25);

/// Background sampler tracking the peak live-thread count of this process.
#[derive(Debug)]
pub struct ResourceMonitor {
    peak: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ResourceMonitor {
    /// Spawn the sampling thread. Sampling begins immediately.
    pub fn start(interval: Duration) -> Self {
        let peak = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let peak = Arc::clone(&peak);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    if let Some(count) = live_thread_count() {
                        peak.fetch_max(count, Ordering::Relaxed);
                    }
                    thread::sleep(interval);
                }
            })
        };

        Self {
            peak,
            stop,
            handle: Some(handle),
        }
    }

    /// Peak observed so far, without stopping the sampler.
    pub fn peak_value(&self) -> usize {
        self.peak.load(Ordering::Relaxed)
    }

    /// Signal the sampler, join it, and return the peak thread count.
    pub fn stop(mut self) -> usize {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.peak.load(Ordering::Relaxed)
    }
}

impl Drop for ResourceMonitor {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Current number of live threads in this process.
#[cfg(target_os = "linux")]
pub fn live_thread_count() -> Option<usize> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    status_field(&status, "Threads:")?.parse().ok()
}

#[cfg(not(target_os = "linux"))]
pub fn live_thread_count() -> Option<usize> {
    None
}

/// Peak resident memory of this process in kilobytes.
///
/// Reads `VmHWM` (resident high-water mark) from `/proc/self/status`,
/// falling back to `VmPeak` when it is absent.
#[cfg(target_os = "linux")]
pub fn peak_memory_kb() -> Option<u64> {
    let status = fs::read_to_string("/proc/self/status").ok()?;
    let field = status_field(&status, "VmHWM:").or_else(|| status_field(&status, "VmPeak:"))?;
    field.parse().ok()
}

#[cfg(not(target_os = "linux"))]
pub fn peak_memory_kb() -> Option<u64> {
    None
}

#[cfg(target_os = "linux")]
fn status_field<'a>(status: &'a str, key: &str) -> Option<&'a str> {
    status
        .lines()
        .find(|line| line.starts_with(key))
        .and_then(|line| line[key.len()..].split_whitespace().next())
}

/// Print the machine-parseable memory-footprint line.
pub fn print_peak_memory() {
    if let Some(kb) = peak_memory_kb() {
        println!("PEAK_MEMORY_MB: {:.1}", kb as f64 / 1024.0);
    }
}
