use anyhow::Result;
use sysmetrics::collector::Collector;
use sysmetrics::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

/// Gap between the baseline cycle and the reported one, so rate percentages are computable.
const BASELINE_GAP: std::time::Duration = std::time::Duration::from_secs(1);

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        proc_root = %app_config.provider.proc_root,
        "collecting"
    );

    let provider = HostProvider::new(&app_config.provider.proc_root);
    let collector = Collector::new(MetricsReader::new(provider), app_config.collection.clone())?;

    let report = tokio::task::spawn_blocking(move || {
        collector.collect();
        std::thread::sleep(BASELINE_GAP);
        collector.collect()
    })
    .await
    .map_err(|e| anyhow::anyhow!("collector task join: {}", e))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
