//! One collection cycle: enumerate, sample in parallel, render.
//!
//! Per-process reads run on a dedicated rayon pool so the number of
//! concurrently open pseudo-files is bounded by the pool size, no matter how
//! many processes the host runs. A failed read only drops that process.

use ahash::AHashMap as HashMap;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, trace, warn};

use crate::error::{CollectError, SkipReason};
use crate::process::{ProcessSample, ProcessSource};
use crate::render::render_document;

/// Result of one per-process task.
#[derive(Debug)]
pub enum SampleOutcome {
    Sampled(ProcessSample),
    Skipped { pid: u32, reason: SkipReason },
}

/// Everything a completed cycle produced.
#[derive(Debug)]
pub struct CycleReport {
    /// Fully rendered exposition document.
    pub document: String,
    /// Number of PIDs found by the enumerator.
    pub enumerated: usize,
    /// Number of processes present in `document`.
    pub sampled: usize,
    /// Skipped processes by reason.
    pub skipped: HashMap<SkipReason, usize>,
    pub duration: Duration,
}

impl CycleReport {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Runs collection cycles against a [`ProcessSource`].
pub struct Collector {
    source: Arc<dyn ProcessSource>,
    pool: rayon::ThreadPool,
}

impl Collector {
    /// Builds a collector whose fan-out uses at most `max_concurrency`
    /// threads (0 = one per CPU).
    pub fn new(source: Arc<dyn ProcessSource>, max_concurrency: usize) -> Result<Self, CollectError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_concurrency)
            .thread_name(|i| format!("proc-reader-{i}"))
            .build()?;
        debug!(
            "Collector worker pool ready with {} threads",
            pool.current_num_threads()
        );
        Ok(Self { source, pool })
    }

    pub fn concurrency(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs one full cycle. Blocks until every per-process task finished.
    ///
    /// Fails only when the PID list cannot be obtained.
    #[instrument(skip(self))]
    pub fn collect(&self) -> Result<CycleReport, CollectError> {
        let start = Instant::now();

        let pids = self
            .source
            .list_pids()
            .map_err(|source| CollectError::Enumerate {
                root: self.source.root().to_path_buf(),
                source,
            })?;
        debug!("Enumerated {} processes", pids.len());

        let source = &self.source;
        let outcomes: Vec<SampleOutcome> = self.pool.install(|| {
            pids.par_iter()
                .map(|&pid| match source.read_sample(pid) {
                    Ok(sample) => SampleOutcome::Sampled(sample),
                    Err(e) => {
                        trace!("Skipping process {}: {}", pid, e);
                        SampleOutcome::Skipped {
                            pid,
                            reason: e.reason(),
                        }
                    }
                })
                .collect()
        });

        self.source.retain_live(&pids);

        let mut samples = Vec::with_capacity(outcomes.len());
        let mut skipped: HashMap<SkipReason, usize> = HashMap::new();
        for outcome in outcomes {
            match outcome {
                SampleOutcome::Sampled(s) => samples.push(s),
                SampleOutcome::Skipped { reason, .. } => *skipped.entry(reason).or_insert(0) += 1,
            }
        }

        if samples.is_empty() && !pids.is_empty() {
            warn!("No process could be sampled out of {} enumerated", pids.len());
        }

        let document = render_document(&samples);

        let report = CycleReport {
            document,
            enumerated: pids.len(),
            sampled: samples.len(),
            skipped,
            duration: start.elapsed(),
        };
        debug!(
            "Collection cycle finished: {} sampled, {} skipped {:?} in {:.2}ms",
            report.sampled,
            report.skipped_total(),
            report.skipped,
            report.duration.as_secs_f64() * 1000.0
        );
        Ok(report)
    }
}
