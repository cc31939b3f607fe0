//! Wire types for the HWiNFO remote monitoring endpoint.
//!
//! These types match the JSON document served at `/json.json`. They cover
//! only the fields this daemon consumes; HWiNFO emits many more, which
//! serde ignores.

use std::fmt;

use serde::Deserialize;

/// Top-level document returned by the monitoring endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorSnapshot {
    pub hwinfo: HwInfoSection,
}

impl SensorSnapshot {
    /// The reading list, in the order the endpoint returned it.
    pub fn readings(&self) -> &[Reading] {
        &self.hwinfo.readings
    }
}

/// The `hwinfo` envelope around the reading list.
#[derive(Debug, Clone, Deserialize)]
pub struct HwInfoSection {
    #[serde(default)]
    pub readings: Vec<Reading>,
}

/// One sensor reading entry.
///
/// `entry_index` is a per-session index assigned by HWiNFO. It is only
/// stable until the monitoring service restarts.
#[derive(Debug, Clone, Deserialize)]
pub struct Reading {
    #[serde(rename = "labelOriginal")]
    pub label_original: String,
    #[serde(rename = "entryIndex")]
    pub entry_index: u32,
    pub value: ReadingValue,
}

/// A reading value, reported either as a JSON number or a numeric string.
///
/// The textual form is significant: frame text is built by clipping the
/// value's string rendering, so a string value must survive verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Number(f64),
    Text(String),
}

impl ReadingValue {
    /// Numeric form, if the value parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReadingValue::Number(n) => Some(*n),
            ReadingValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadingValue::Number(n) => write!(f, "{}", n),
            ReadingValue::Text(s) => f.write_str(s),
        }
    }
}
