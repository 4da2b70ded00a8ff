//! Replay a JSON-lines event log into a [`BookRegistry`].

use std::io::BufRead;

use booktrack_ingress::decode_event;
use booktrack_types::{ErrorPolicy, Result};
use serde::{Deserialize, Serialize};

use crate::BookRegistry;

/// Counters for one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaySummary {
    /// Non-blank lines read.
    pub lines_read: u64,
    pub events_applied: u64,
    pub events_rejected: u64,
    pub fills: u64,
}

/// Decode every line of `reader` and route it to its book.
///
/// Blank lines are ignored. Under [`ErrorPolicy::Halt`] the first line that
/// fails to decode or apply is returned as the error; under
/// [`ErrorPolicy::Skip`] it is logged and counted and the replay continues.
/// Read errors always stop the replay.
pub fn replay<R: BufRead>(
    reader: R,
    registry: &BookRegistry,
    policy: ErrorPolicy,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines_read += 1;

        let outcome = decode_event(line).and_then(|event| registry.apply(&event));
        match outcome {
            Ok(report) => {
                summary.events_applied += 1;
                summary.fills += report.fills.len() as u64;
            }
            Err(err) => {
                tracing::warn!(line = index + 1, error = %err, "Event rejected");
                match policy {
                    ErrorPolicy::Halt => return Err(err),
                    ErrorPolicy::Skip => summary.events_rejected += 1,
                }
            }
        }
    }

    tracing::info!(
        lines = summary.lines_read,
        applied = summary.events_applied,
        rejected = summary.events_rejected,
        fills = summary.fills,
        "Replay complete"
    );
    Ok(summary)
}
