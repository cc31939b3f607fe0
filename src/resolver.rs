//! Sensor label resolution.
//!
//! HWiNFO addresses readings by a per-session entry index, so the daemon
//! scans the full reading list once to map each configured label to its
//! index. Restricted fetches (`enable=`) return only the requested
//! entries, ordered by entry index, which makes a sensor addressable by
//! its *rank*: the 0-based position of its entry index among all wanted
//! sensors, sorted ascending.
//!
//! The mapping is built once and never invalidated. If the monitoring
//! service restarts and reassigns indices, resolution silently goes stale
//! until this process is restarted too.

use thiserror::Error;

use crate::source::SensorSnapshot;

/// Raised when a restricted fetch is requested while one or more wanted
/// labels never matched a reading during the scan.
#[derive(Debug, Error)]
#[error("sensor labels not found in monitor output: {}", labels.join(", "))]
pub struct UnresolvedSensors {
    pub labels: Vec<String>,
}

/// One configured sensor and its resolution state.
#[derive(Debug, Clone)]
struct WantedSensor {
    label: String,
    entry_index: Option<u32>,
    rank: Option<usize>,
}

/// Maps configured sensor labels to entry indices and ranks.
///
/// Starts unresolved; [`SensorResolver::resolve`] transitions it to the
/// resolved state exactly once, after the first successful scan. Labels
/// absent from that scan stay unresolved for the life of the process.
#[derive(Debug)]
pub struct SensorResolver {
    wanted: Vec<WantedSensor>,
    resolved: bool,
}

impl SensorResolver {
    /// Create a resolver for the given labels, all initially unresolved.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let wanted = labels
            .into_iter()
            .map(|label| WantedSensor {
                label: label.into(),
                entry_index: None,
                rank: None,
            })
            .collect();
        Self {
            wanted,
            resolved: false,
        }
    }

    /// Whether a scan has completed (regardless of how many labels matched).
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Scan a full snapshot and record each wanted label's entry index.
    ///
    /// The first reading with a matching `labelOriginal` wins; duplicates
    /// later in the list are ignored. After the scan, resolved sensors are
    /// ranked 0..n-1 by entry index.
    pub fn resolve(&mut self, snapshot: &SensorSnapshot) {
        for reading in snapshot.readings() {
            for sensor in self.wanted.iter_mut() {
                if sensor.label == reading.label_original && sensor.entry_index.is_none() {
                    sensor.entry_index = Some(reading.entry_index);
                }
            }
        }

        // Rank resolved sensors by entry index. The restricted fetch
        // returns readings in this order.
        let mut order: Vec<usize> = (0..self.wanted.len())
            .filter(|&i| self.wanted[i].entry_index.is_some())
            .collect();
        order.sort_by_key(|&i| self.wanted[i].entry_index);
        for (rank, &i) in order.iter().enumerate() {
            self.wanted[i].rank = Some(rank);
        }

        self.resolved = true;
    }

    /// Entry indices for the `enable=` query parameter.
    ///
    /// Errs if any wanted label is still unresolved: a partial fetch would
    /// shift every rank and mislabel the readings.
    pub fn enable_indices(&self) -> Result<Vec<u32>, UnresolvedSensors> {
        let missing: Vec<String> = self
            .wanted
            .iter()
            .filter(|s| s.entry_index.is_none())
            .map(|s| s.label.clone())
            .collect();

        if !missing.is_empty() {
            return Err(UnresolvedSensors { labels: missing });
        }

        Ok(self.wanted.iter().filter_map(|s| s.entry_index).collect())
    }

    /// The rank of a label within a restricted fetch response.
    pub fn rank_of(&self, label: &str) -> Option<usize> {
        self.wanted.iter().find(|s| s.label == label).and_then(|s| s.rank)
    }

    /// Labels that did not match any reading during the scan.
    pub fn unresolved_labels(&self) -> Vec<&str> {
        self.wanted
            .iter()
            .filter(|s| s.entry_index.is_none())
            .map(|s| s.label.as_str())
            .collect()
    }
}
