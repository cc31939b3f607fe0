use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to nanoseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ms", 1_000_000.0),
    ("m", 60_000_000_000.0),
    ("s", 1_000_000_000.0),
];

/// Parse interval strings like "3s", "500ms", "1.5s", "2m"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            if val < 0.0 {
                bail!("Negative duration: {}", s);
            }
            return Ok(Duration::from_nanos((val * multiplier) as u64));
        }
    }

    // A bare number means seconds
    if let Ok(val) = s.parse::<f64>() {
        if val >= 0.0 {
            return Ok(Duration::from_nanos((val * 1_000_000_000.0) as u64));
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Format a duration for display
pub fn format_duration(d: Duration) -> String {
    let millis = d.as_millis();
    if millis < 1_000 {
        format!("{}ms", millis)
    } else if millis % 1_000 == 0 {
        format!("{}s", millis / 1_000)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
