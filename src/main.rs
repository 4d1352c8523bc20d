use std::process::ExitCode;

use rand::SeedableRng;
use rand::rngs::StdRng;
use telemetry::buffer::EventStore;
use telemetry::dashboard;
use telemetry::generator::EventGenerator;
use telemetry::query::FilterCriteria;
use telemetry::{Dashboard, RefreshService};

mod cli;
mod config;
mod config_file;
mod report;
mod signals;
mod telemetry;

const CONTROL_CHANNEL_SIZE: usize = 8;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger
    env_logger::init();

    let args = cli::get_cli_args();

    let config = match config_file::PipewatchConfigFile::try_init(&args.config, &args.vars) {
        Ok(config) => config.into_config(),
        Err(err) => {
            eprintln!("Unable to read config: {err}");
            return ExitCode::FAILURE;
        }
    };

    let filter = match FilterCriteria::parse(&args.pipeline, &args.environment, &args.search) {
        Ok(filter) => filter,
        Err(err) => {
            eprintln!("Invalid filter: {err}");
            return ExitCode::FAILURE;
        }
    };

    let snapshot = config
        .snapshot
        .as_ref()
        .filter(|_| !args.no_snapshot)
        .map(|s| s.store());

    let mut dashboard = Dashboard::new(
        EventStore::new(config.max_events),
        EventGenerator::new(StdRng::from_os_rng()),
    );
    if let Some(snapshot) = &snapshot {
        dashboard = dashboard.with_history(snapshot.load(config.max_events).await);
    }
    dashboard.set_filter(filter);
    dashboard.seed(config.seed_count, config.seed_spacing, chrono::Utc::now());
    if dashboard.store().is_empty() {
        log::info!("Seeding disabled, the first run arrives with the first tick");
    } else {
        log::info!(
            "Seeded {} runs, keeping at most {}",
            dashboard.store().len(),
            dashboard.store().capacity()
        );
    }
    let dashboard = dashboard.into_shared();

    let (tx, rx) = tokio::sync::mpsc::channel(CONTROL_CHANNEL_SIZE);
    if let Err(err) = signals::handle_shutdown(tx) {
        eprintln!("Unable to register signal handlers: {err}");
        return ExitCode::FAILURE;
    }

    let mut service = RefreshService::new(dashboard.clone(), config.refresh_interval, rx);
    if let Some(snapshot) = snapshot {
        service = service.with_snapshot(snapshot);
    }
    let mut updates = service.subscribe();
    let service = tokio::spawn(service.run());

    println!("{}", report::render(&dashboard::lock(&dashboard), config.bucket_count));
    // Ends once the service drops its sender.
    while updates.changed().await.is_ok() {
        let rendered = report::render(&dashboard::lock(&dashboard), config.bucket_count);
        println!("{rendered}");
    }

    match service.await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Refresh service failed: {err}");
            ExitCode::FAILURE
        }
    }
}
