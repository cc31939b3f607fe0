//! Runtime settings.
//!
//! Settings are layered, later sources winning: built-in defaults, an
//! optional TOML file, `LAMETRIC_*` environment variables, then
//! command-line flags. Everything is read once at startup; there is no
//! live reconfiguration.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use reqwest::Url;
use serde::Deserialize;

use crate::duration::parse_duration;

/// The labels of the four sensors shown on the display, as they appear in
/// HWiNFO's "Label (Original)" column.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorLabels {
    pub cpu: String,
    pub gpu: String,
    pub water: String,
    pub vcore: String,
}

impl SensorLabels {
    /// All four labels, in display order.
    pub fn all(&self) -> [&str; 4] {
        [&self.cpu, &self.gpu, &self.water, &self.vcore]
    }
}

/// Complete daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Host of the HWiNFO remote monitor.
    pub monitor_host: String,
    /// Port of the HWiNFO remote monitor.
    pub monitor_port: u16,
    /// Local push URL of the LaMetric device (no default; must be set).
    pub push_url: String,
    /// LaMetric app access token (no default; must be set).
    pub access_token: String,
    /// Wanted sensor labels.
    pub sensors: SensorLabels,
    /// Temperature at or below which the cold icon is shown, in °C.
    pub cold_threshold: f64,
    /// Temperature above which the hot icon is shown, in °C.
    pub hot_threshold: f64,
    /// Poll interval, e.g. "3s" or "500ms".
    pub interval: String,
}

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub monitor_host: Option<String>,
    pub monitor_port: Option<u16>,
    pub push_url: Option<String>,
    pub access_token: Option<String>,
    pub interval: Option<String>,
    pub cold_threshold: Option<f64>,
    pub hot_threshold: Option<f64>,
}

impl Settings {
    /// Load settings from defaults, an optional TOML file, the
    /// environment, and command-line overrides.
    pub fn load(config_file: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("monitor_host", "127.0.0.1")?
            .set_default("monitor_port", 8085_i64)?
            .set_default("sensors.cpu", "CPU Package")?
            .set_default("sensors.gpu", "GPU Temperature")?
            .set_default("sensors.water", "T_Sensor1")?
            .set_default("sensors.vcore", "Vcore")?
            .set_default("cold_threshold", 55.0)?
            .set_default("hot_threshold", 75.0)?
            .set_default("interval", "3s")?;

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix("LAMETRIC").separator("__"));

        builder = builder
            .set_override_option("monitor_host", overrides.monitor_host)?
            .set_override_option("monitor_port", overrides.monitor_port.map(i64::from))?
            .set_override_option("push_url", overrides.push_url)?
            .set_override_option("access_token", overrides.access_token)?
            .set_override_option("interval", overrides.interval)?
            .set_override_option("cold_threshold", overrides.cold_threshold)?
            .set_override_option("hot_threshold", overrides.hot_threshold)?;

        let settings: Settings = builder
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("invalid configuration (push_url and access_token are required)")?;

        Ok(settings)
    }

    /// The monitoring endpoint URL.
    pub fn monitor_url(&self) -> Result<Url> {
        let raw = format!("http://{}:{}/json.json", self.monitor_host, self.monitor_port);
        Url::parse(&raw).with_context(|| format!("invalid monitor address: {}", raw))
    }

    /// The display push URL, validated.
    pub fn parsed_push_url(&self) -> Result<Url> {
        Url::parse(&self.push_url).with_context(|| format!("invalid push URL: {}", self.push_url))
    }

    /// The poll interval, parsed.
    pub fn poll_interval(&self) -> Result<Duration> {
        parse_duration(&self.interval)
            .with_context(|| format!("invalid poll interval: {}", self.interval))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn required() -> Overrides {
        Overrides {
            push_url: Some("https://192.168.1.50:4343/api/v1/dev/widget/update/com.test/1".into()),
            access_token: Some("token".into()),
            ..Overrides::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load(None, required()).unwrap();

        assert_eq!(settings.monitor_host, "127.0.0.1");
        assert_eq!(settings.monitor_port, 8085);
        assert_eq!(settings.sensors.cpu, "CPU Package");
        assert_eq!(settings.sensors.gpu, "GPU Temperature");
        assert_eq!(settings.sensors.water, "T_Sensor1");
        assert_eq!(settings.sensors.vcore, "Vcore");
        assert_eq!(settings.cold_threshold, 55.0);
        assert_eq!(settings.hot_threshold, 75.0);
        assert_eq!(settings.poll_interval().unwrap(), Duration::from_secs(3));
        assert_eq!(
            settings.monitor_url().unwrap().as_str(),
            "http://127.0.0.1:8085/json.json"
        );
    }

    #[test]
    fn test_missing_required_values() {
        assert!(Settings::load(None, Overrides::default()).is_err());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
monitor_host = "192.168.1.20"
monitor_port = 8086
cold_threshold = 45.0

[sensors]
water = "T_Sensor2"
"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path()), required()).unwrap();
        assert_eq!(settings.monitor_host, "192.168.1.20");
        assert_eq!(settings.monitor_port, 8086);
        assert_eq!(settings.cold_threshold, 45.0);
        assert_eq!(settings.sensors.water, "T_Sensor2");
        // Untouched defaults survive a partial file.
        assert_eq!(settings.sensors.cpu, "CPU Package");
        assert_eq!(settings.hot_threshold, 75.0);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "monitor_host = \"192.168.1.20\"").unwrap();

        let mut overrides = required();
        overrides.monitor_host = Some("10.0.0.9".into());

        let settings = Settings::load(Some(file.path()), overrides).unwrap();
        assert_eq!(settings.monitor_host, "10.0.0.9");
    }

    #[test]
    fn test_invalid_push_url_fails_validation() {
        let mut overrides = required();
        overrides.push_url = Some("not a url".into());

        let settings = Settings::load(None, overrides).unwrap();
        assert!(settings.parsed_push_url().is_err());
    }

    #[test]
    fn test_invalid_monitor_host_fails_validation() {
        let mut overrides = required();
        overrides.monitor_host = Some("bad host name".into());

        let settings = Settings::load(None, overrides).unwrap();
        assert!(settings.monitor_url().is_err());
    }

    #[test]
    fn test_invalid_interval_fails_validation() {
        let mut overrides = required();
        overrides.interval = Some("soon".into());

        let settings = Settings::load(None, overrides).unwrap();
        assert!(settings.poll_interval().is_err());
    }
}
