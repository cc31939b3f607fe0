use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lametric_hwmon::duration::format_duration;
use lametric_hwmon::{App, HttpSource, IconThresholds, LaMetricSink, Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "lametric-hwmon")]
#[command(about = "Pushes live HWiNFO sensor readings to a LaMetric Time display")]
#[command(version)]
struct Args {
    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host of the HWiNFO remote monitor
    #[arg(long)]
    monitor_host: Option<String>,

    /// Port of the HWiNFO remote monitor
    #[arg(long)]
    monitor_port: Option<u16>,

    /// Local push URL of the LaMetric device
    #[arg(long)]
    push_url: Option<String>,

    /// LaMetric app access token
    #[arg(long)]
    access_token: Option<String>,

    /// Poll interval (e.g. "3s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Temperature at or below which the cold icon is shown, in °C
    #[arg(long)]
    cold: Option<f64>,

    /// Temperature above which the hot icon is shown, in °C
    #[arg(long)]
    hot: Option<f64>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            monitor_host: self.monitor_host.clone(),
            monitor_port: self.monitor_port,
            push_url: self.push_url.clone(),
            access_token: self.access_token.clone(),
            interval: self.interval.clone(),
            cold_threshold: self.cold,
            hot_threshold: self.hot,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::load(args.config.as_deref(), args.overrides())?;

    // Validate everything the loop will rely on before it starts; a bad
    // URL or interval is the one kind of error that is fatal here.
    let monitor_url = settings.monitor_url()?;
    let push_url = settings.parsed_push_url()?;
    let interval = settings.poll_interval()?;

    info!(
        monitor = %monitor_url,
        display = %push_url,
        interval = %format_duration(interval),
        "lametric-hwmon v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let source = HttpSource::new(monitor_url)?;
    let sink = LaMetricSink::new(push_url, &settings.access_token)?;
    let thresholds = IconThresholds {
        cold: settings.cold_threshold,
        hot: settings.hot_threshold,
    };

    let mut app = App::new(
        Box::new(source),
        Box::new(sink),
        settings.sensors.clone(),
        thresholds,
        interval,
    );

    app.run().await
}
