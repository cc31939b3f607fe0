//! The poll loop: resolve, fetch, format, push.
//!
//! One logical task drives everything. Each tick is strictly sequential
//! (at most one fetch and one push in flight), and all per-tick errors
//! are recoverable: the loop logs, abandons the tick, and tries again
//! after the next sleep.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::config::SensorLabels;
use crate::frames::{self, FramePayload, IconThresholds, SensorReadings};
use crate::push::FrameSink;
use crate::resolver::SensorResolver;
use crate::source::{ReadingValue, ReadingsSource, SensorSnapshot, SourceError};

/// The poll loop driver.
///
/// Owns the resolver state, the data source, and the display sink. Ticks
/// never demote the resolver: once a scan has completed, the label→index
/// mapping is trusted for the rest of the process's life, even across
/// source outages.
pub struct App {
    source: Box<dyn ReadingsSource>,
    sink: Box<dyn FrameSink>,
    resolver: SensorResolver,
    labels: SensorLabels,
    thresholds: IconThresholds,
    interval: Duration,
}

impl App {
    /// Create the loop driver with an unresolved sensor set.
    pub fn new(
        source: Box<dyn ReadingsSource>,
        sink: Box<dyn FrameSink>,
        labels: SensorLabels,
        thresholds: IconThresholds,
        interval: Duration,
    ) -> Self {
        let resolver = SensorResolver::new(labels.all().map(str::to_string));
        Self {
            source,
            sink,
            resolver,
            labels,
            thresholds,
            interval,
        }
    }

    /// Run ticks until ctrl-c.
    ///
    /// The shutdown signal is observed during the sleep, between ticks;
    /// an in-flight tick always completes first.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            source = self.source.description(),
            sink = self.sink.description(),
            "starting poll loop"
        );

        loop {
            self.tick().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    /// One poll cycle.
    pub async fn tick(&mut self) {
        if !self.resolver.is_resolved() {
            info!("scanning for sensors");
            match self.source.scan().await {
                Ok(snapshot) => {
                    self.resolver.resolve(&snapshot);
                    let missing = self.resolver.unresolved_labels();
                    if missing.is_empty() {
                        info!("sensor scan complete");
                    } else {
                        error!(
                            ?missing,
                            "sensor labels not present in monitor output; \
                             their readings will stay unavailable"
                        );
                    }
                }
                Err(err) => {
                    warn!(%err, "sensor scan failed, retrying next tick");
                    return;
                }
            }
        }

        let indices = match self.resolver.enable_indices() {
            Ok(indices) => indices,
            Err(err) => {
                error!(%err, "abandoning tick");
                return;
            }
        };

        let snapshot = match self.source.fetch(&indices).await {
            Ok(snapshot) => snapshot,
            Err(SourceError::Offline(err)) => {
                warn!(%err, "monitoring source offline");
                self.sink.push(&frames::offline_payload()).await;
                return;
            }
            Err(err) => {
                warn!(%err, "fetch failed, abandoning tick");
                return;
            }
        };

        match self.build_payload(&snapshot) {
            Ok(payload) => {
                debug!(frames = payload.frames.len(), "tick complete");
                self.sink.push(&payload).await;
            }
            Err(err) => {
                warn!(%err, "could not build frames, abandoning tick");
            }
        }
    }

    fn build_payload(&self, snapshot: &SensorSnapshot) -> Result<FramePayload, SourceError> {
        let readings = SensorReadings {
            cpu: self.reading_for(snapshot, &self.labels.cpu)?,
            gpu: self.reading_for(snapshot, &self.labels.gpu)?,
            water: self.reading_for(snapshot, &self.labels.water)?,
            vcore: self.reading_for(snapshot, &self.labels.vcore)?,
        };
        readings.to_frames(&self.thresholds)
    }

    /// Look up a label's reading in a restricted fetch response by rank.
    fn reading_for(
        &self,
        snapshot: &SensorSnapshot,
        label: &str,
    ) -> Result<ReadingValue, SourceError> {
        let rank = self
            .resolver
            .rank_of(label)
            .ok_or_else(|| SourceError::Malformed(format!("sensor '{}' has no rank", label)))?;

        let reading = snapshot.readings().get(rank).ok_or_else(|| {
            SourceError::Malformed(format!(
                "response has {} readings, expected one at rank {} for '{}'",
                snapshot.readings().len(),
                rank,
                label
            ))
        })?;

        Ok(reading.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::{ICON_OFFLINE, ICON_VOLTAGE, ICON_WATER};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    fn test_labels() -> SensorLabels {
        SensorLabels {
            cpu: "CPU Package".to_string(),
            gpu: "GPU Temperature".to_string(),
            water: "T_Sensor1".to_string(),
            vcore: "Vcore".to_string(),
        }
    }

    fn full_snapshot(entries: &[(&str, u32, f64)]) -> SensorSnapshot {
        let readings: Vec<serde_json::Value> = entries
            .iter()
            .map(|(label, index, value)| {
                serde_json::json!({
                    "labelOriginal": label,
                    "entryIndex": index,
                    "value": value
                })
            })
            .collect();
        serde_json::from_value(serde_json::json!({ "hwinfo": { "readings": readings } })).unwrap()
    }

    /// In-memory source that mimics the HWiNFO endpoint: a scan returns
    /// the full reading list, a fetch returns the requested entries in
    /// entry-index order.
    struct FakeMonitor {
        snapshot: SensorSnapshot,
        scan_offline: AtomicBool,
        fetch_offline: AtomicBool,
    }

    impl FakeMonitor {
        fn new(snapshot: SensorSnapshot) -> Self {
            Self {
                snapshot,
                scan_offline: AtomicBool::new(false),
                fetch_offline: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl ReadingsSource for Arc<FakeMonitor> {
        async fn scan(&self) -> Result<SensorSnapshot, SourceError> {
            if self.scan_offline.load(Ordering::SeqCst) {
                return Err(SourceError::Offline("connection refused".to_string()));
            }
            Ok(self.snapshot.clone())
        }

        async fn fetch(&self, entry_indices: &[u32]) -> Result<SensorSnapshot, SourceError> {
            if self.fetch_offline.load(Ordering::SeqCst) {
                return Err(SourceError::Offline("timed out".to_string()));
            }
            let mut readings: Vec<_> = self
                .snapshot
                .readings()
                .iter()
                .filter(|r| entry_indices.contains(&r.entry_index))
                .cloned()
                .collect();
            readings.sort_by_key(|r| r.entry_index);
            Ok(SensorSnapshot {
                hwinfo: crate::source::HwInfoSection { readings },
            })
        }

        fn description(&self) -> &str {
            "fake monitor"
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        pushed: Mutex<Vec<FramePayload>>,
    }

    #[async_trait]
    impl FrameSink for Arc<RecordingSink> {
        async fn push(&self, payload: &FramePayload) {
            self.pushed.lock().unwrap().push(payload.clone());
        }

        fn description(&self) -> &str {
            "recording sink"
        }
    }

    fn make_app(monitor: Arc<FakeMonitor>, sink: Arc<RecordingSink>) -> App {
        App::new(
            Box::new(monitor),
            Box::new(sink),
            test_labels(),
            IconThresholds::default(),
            Duration::from_secs(3),
        )
    }

    fn healthy_snapshot() -> SensorSnapshot {
        // Deliberately shuffled, with extra sensors the daemon ignores.
        full_snapshot(&[
            ("Vcore", 90, 1.224),
            ("Fan2", 3, 1200.0),
            ("CPU Package", 17, 48.5),
            ("T_Sensor1", 60, 33.1),
            ("GPU Temperature", 54, 61.0),
        ])
    }

    #[tokio::test]
    async fn test_tick_pushes_four_frames_in_order() {
        let monitor = Arc::new(FakeMonitor::new(healthy_snapshot()));
        let sink = Arc::new(RecordingSink::default());
        let mut app = make_app(monitor, sink.clone());

        app.tick().await;

        let pushed = sink.pushed.lock().unwrap();
        assert_eq!(pushed.len(), 1);
        let frames = &pushed[0].frames;
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].text, "CPU 48°");
        assert_eq!(frames[1].text, "GPU 61°");
        assert_eq!(frames[2].text, "H2O 33°");
        assert_eq!(frames[2].icon, ICON_WATER);
        assert_eq!(frames[3].text, "VC 1.22");
        assert_eq!(frames[3].icon, ICON_VOLTAGE);
    }

    #[tokio::test]
    async fn test_fetch_offline_pushes_offline_notice() {
        let monitor = Arc::new(FakeMonitor::new(healthy_snapshot()));
        let sink = Arc::new(RecordingSink::default());
        let mut app = make_app(monitor.clone(), sink.clone());

        // First tick resolves and pushes normally.
        app.tick().await;
        // Then the monitoring source goes away.
        monitor.fetch_offline.store(true, Ordering::SeqCst);
        app.tick().await;

        let pushed = sink.pushed.lock().unwrap();
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed[1].frames.len(), 1);
        assert_eq!(pushed[1].frames[0].text, "SYSTEM OFFLINE");
        assert_eq!(pushed[1].frames[0].icon, ICON_OFFLINE);
    }

    #[tokio::test]
    async fn test_scan_failure_skips_tick_and_retries() {
        let monitor = Arc::new(FakeMonitor::new(healthy_snapshot()));
        monitor.scan_offline.store(true, Ordering::SeqCst);
        let sink = Arc::new(RecordingSink::default());
        let mut app = make_app(monitor.clone(), sink.clone());

        // Scan fails: nothing is pushed, not even an offline notice.
        app.tick().await;
        assert!(sink.pushed.lock().unwrap().is_empty());

        // Source comes back: the next tick resolves and pushes.
        monitor.scan_offline.store(false, Ordering::SeqCst);
        app.tick().await;
        assert_eq!(sink.pushed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_label_abandons_every_tick() {
        // No T_Sensor1 anywhere in the reading list.
        let monitor = Arc::new(FakeMonitor::new(full_snapshot(&[
            ("Vcore", 90, 1.224),
            ("CPU Package", 17, 48.5),
            ("GPU Temperature", 54, 61.0),
        ])));
        let sink = Arc::new(RecordingSink::default());
        let mut app = make_app(monitor, sink.clone());

        app.tick().await;
        app.tick().await;

        // The scan completed, but no payload is ever pushed.
        assert!(sink.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_identical_ticks_produce_identical_payloads() {
        let monitor = Arc::new(FakeMonitor::new(healthy_snapshot()));
        let sink = Arc::new(RecordingSink::default());
        let mut app = make_app(monitor, sink.clone());

        app.tick().await;
        app.tick().await;

        let pushed = sink.pushed.lock().unwrap();
        assert_eq!(pushed.len(), 2);
        assert_eq!(
            serde_json::to_vec(&pushed[0]).unwrap(),
            serde_json::to_vec(&pushed[1]).unwrap()
        );
    }
}
