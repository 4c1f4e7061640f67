//! Independent extractions for several processes on a worker pool

use crate::core::types::{CmdlineResult, ProcessId, ProcessStrings};
use crate::extractor::argv::split_command_line;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of one extraction in a batch
#[derive(Debug)]
pub struct BatchEntry<T> {
    pub pid: ProcessId,
    pub result: CmdlineResult<T>,
}

impl<T> BatchEntry<T> {
    /// Whether the extraction succeeded
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Serializable form of a batch entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub pid: ProcessId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchReport {
    /// Build a report from an entry, keeping only the requested parts
    pub fn from_entry(
        entry: &BatchEntry<ProcessStrings>,
        include_image_path: bool,
        split_arguments: bool,
    ) -> Self {
        match &entry.result {
            Ok(strings) => BatchReport {
                pid: entry.pid,
                image_path: include_image_path.then(|| strings.image_path.clone()),
                command_line: Some(strings.command_line.clone()),
                arguments: split_arguments.then(|| split_command_line(&strings.command_line)),
                error: None,
            },
            Err(err) => BatchReport {
                pid: entry.pid,
                image_path: None,
                command_line: None,
                arguments: None,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Run `extract` for every pid on a pool of `worker_threads` threads.
///
/// Entries come back in the order of `pids`. Each extraction is independent;
/// a failure is recorded in its own entry only.
pub fn extract_batch<T, F>(
    pids: &[ProcessId],
    worker_threads: usize,
    extract: F,
) -> CmdlineResult<Vec<BatchEntry<T>>>
where
    T: Send,
    F: Fn(ProcessId) -> CmdlineResult<T> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(worker_threads)
        .thread_name(|index| format!("cmdline-worker-{}", index))
        .build()?;

    debug!(count = pids.len(), worker_threads, "starting batch extraction");
    let entries: Vec<BatchEntry<T>> = pool.install(|| {
        pids.par_iter()
            .map(|&pid| BatchEntry {
                pid,
                result: extract(pid),
            })
            .collect()
    });
    Ok(entries)
}
