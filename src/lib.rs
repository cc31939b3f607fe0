//! # lametric-hwmon
//!
//! A small daemon that pushes live HWiNFO sensor readings to a LaMetric
//! Time display.
//!
//! It polls HWiNFO's remote monitoring endpoint on a fixed interval,
//! extracts a configured set of sensor readings, formats them into the
//! display's frame payload, and POSTs the payload to the device's local
//! push API.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                          App (loop)                        │
//! │                                                            │
//! │  ┌──────────┐   ┌──────────┐   ┌─────────┐   ┌─────────┐  │
//! │  │  source  │──▶│ resolver │──▶│ frames  │──▶│  push   │  │
//! │  │ (HWiNFO) │   │ (ranks)  │   │ (format)│   │(LaMetric)│ │
//! │  └──────────┘   └──────────┘   └─────────┘   └─────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: data source abstraction ([`ReadingsSource`] trait)
//!   with the HTTP implementation and the endpoint's wire types
//! - **[`resolver`]**: one-shot mapping of sensor labels to HWiNFO entry
//!   indices and fetch-time ranks
//! - **[`frames`]**: pure formatting of readings into display frames,
//!   including threshold-based icon selection
//! - **[`push`]**: delivery to the display ([`FrameSink`] trait) with the
//!   LaMetric local push API implementation
//! - **[`app`]**: the tick loop tying the pieces together
//! - **[`config`]**: layered settings (defaults, TOML file, environment,
//!   CLI)
//!
//! ## Usage
//!
//! ```bash
//! # Everything on defaults, credentials from the environment
//! LAMETRIC_PUSH_URL=https://192.168.1.50:4343/api/v1/dev/widget/update/com.example/1 \
//! LAMETRIC_ACCESS_TOKEN=abc123 \
//! lametric-hwmon
//!
//! # Or from a settings file, polling every five seconds
//! lametric-hwmon --config hwmon.toml --interval 5s
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::time::Duration;
//! use lametric_hwmon::{App, HttpSource, IconThresholds, LaMetricSink, SensorLabels};
//!
//! # tokio_test::block_on(async {
//! let monitor = reqwest::Url::parse("http://127.0.0.1:8085/json.json").unwrap();
//! let display = reqwest::Url::parse("https://192.168.1.50:4343/api/v1/dev/widget/update/com.example/1").unwrap();
//!
//! let labels = SensorLabels {
//!     cpu: "CPU Package".into(),
//!     gpu: "GPU Temperature".into(),
//!     water: "T_Sensor1".into(),
//!     vcore: "Vcore".into(),
//! };
//!
//! let mut app = App::new(
//!     Box::new(HttpSource::new(monitor).unwrap()),
//!     Box::new(LaMetricSink::new(display, "token").unwrap()),
//!     labels,
//!     IconThresholds::default(),
//!     Duration::from_secs(3),
//! );
//! app.run().await.unwrap();
//! # });
//! ```

pub mod app;
pub mod config;
pub mod duration;
pub mod frames;
pub mod push;
pub mod resolver;
pub mod source;

// Re-export main types for convenience
pub use app::App;
pub use config::{Overrides, SensorLabels, Settings};
pub use frames::{Frame, FramePayload, IconThresholds, SensorReadings};
pub use push::{FrameSink, LaMetricSink};
pub use resolver::{SensorResolver, UnresolvedSensors};
pub use source::{HttpSource, Reading, ReadingValue, ReadingsSource, SensorSnapshot, SourceError};
