//! LaMetric frame construction.
//!
//! Transforms raw sensor readings into the small frame payload the
//! display accepts. Frame text is clipped to a fixed number of characters
//! of the value's textual form. That is a width clamp for the device's
//! 37-pixel line, not numeric rounding, and the device firmware expects
//! it: `72.5` displays as `72°`, `1.234` as `1.23`.

use serde::Serialize;

use crate::source::{ReadingValue, SourceError};

/// Icon shown when the temperature is at or below the cold threshold.
pub const ICON_COLD: &str = "a26356";
/// Icon shown between the thresholds (inclusive of the hot boundary).
pub const ICON_NEUTRAL: &str = "a26358";
/// Icon shown above the hot threshold.
pub const ICON_HOT: &str = "a26357";
/// Fixed icon for the coolant temperature frame.
pub const ICON_WATER: &str = "a26855";
/// Fixed icon for the core voltage frame.
pub const ICON_VOLTAGE: &str = "a27512";
/// Fixed icon for the offline notice.
pub const ICON_OFFLINE: &str = "a27513";

/// One unit of displayable content: short text plus an icon identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub text: String,
    pub icon: String,
}

impl Frame {
    fn new(text: String, icon: &str) -> Self {
        Self {
            text,
            icon: icon.to_string(),
        }
    }
}

/// The payload POSTed to the display's push endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FramePayload {
    pub frames: Vec<Frame>,
}

/// Temperature boundaries for icon selection, in °C.
#[derive(Debug, Clone, Copy)]
pub struct IconThresholds {
    pub cold: f64,
    pub hot: f64,
}

impl Default for IconThresholds {
    fn default() -> Self {
        Self {
            cold: 55.0,
            hot: 75.0,
        }
    }
}

/// The four readings of one display refresh, in display order.
#[derive(Debug, Clone)]
pub struct SensorReadings {
    pub cpu: ReadingValue,
    pub gpu: ReadingValue,
    pub water: ReadingValue,
    pub vcore: ReadingValue,
}

impl SensorReadings {
    /// Build the four-frame payload: CPU, GPU, H2O, VC.
    ///
    /// The CPU and GPU icons depend on the numeric value; a temperature
    /// reading that does not parse as a number is rejected here rather
    /// than displayed with a guessed icon.
    pub fn to_frames(&self, thresholds: &IconThresholds) -> Result<FramePayload, SourceError> {
        let cpu_temp = numeric(&self.cpu, "CPU temperature")?;
        let gpu_temp = numeric(&self.gpu, "GPU temperature")?;

        let frames = vec![
            Frame::new(
                format!("CPU {}°", clip(&self.cpu.to_string(), 2)),
                temperature_icon(cpu_temp, thresholds),
            ),
            Frame::new(
                format!("GPU {}°", clip(&self.gpu.to_string(), 2)),
                temperature_icon(gpu_temp, thresholds),
            ),
            Frame::new(
                format!("H2O {}°", clip(&self.water.to_string(), 2)),
                ICON_WATER,
            ),
            Frame::new(format!("VC {}", clip(&self.vcore.to_string(), 4)), ICON_VOLTAGE),
        ];

        Ok(FramePayload { frames })
    }
}

/// The single-frame payload shown when the monitoring source is offline.
pub fn offline_payload() -> FramePayload {
    FramePayload {
        frames: vec![Frame::new("SYSTEM OFFLINE".to_string(), ICON_OFFLINE)],
    }
}

/// Select the temperature icon. Both boundaries are inclusive: exactly
/// cold shows the cold icon, exactly hot still shows the neutral one.
fn temperature_icon(value: f64, thresholds: &IconThresholds) -> &'static str {
    if value <= thresholds.cold {
        ICON_COLD
    } else if value <= thresholds.hot {
        ICON_NEUTRAL
    } else {
        ICON_HOT
    }
}

/// First `n` characters of the text, sign included.
fn clip(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

fn numeric(value: &ReadingValue, what: &str) -> Result<f64, SourceError> {
    value
        .as_f64()
        .ok_or_else(|| SourceError::Malformed(format!("{} is not numeric: {}", what, value)))
}
