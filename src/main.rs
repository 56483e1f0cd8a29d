//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; the ballot flow lives in BallotService.

use dotenv::dotenv;
use election_poll::adapters::api::{HttpPollApi, OfflinePollApi};
use election_poll::adapters::ui::tui::{TuiInputPort, TuiSettings};
use election_poll::ports::{
    CandidateDirectoryPort, ContactCheckPort, InputPort, ResultsPort, VoteSubmissionPort,
};
use election_poll::shared::config::AppConfig;
use election_poll::usecases::{BallotPorts, ResultsService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    // Default to warn so log lines do not interleave with the prompts.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "invalid configuration, using defaults");
            AppConfig::default()
        }
    };

    election_poll::adapters::ui::init_ui(cfg.theme_or_default());

    // --- Poll API: one adapter serves every outbound port ---
    let (directory, contacts, submissions, results): (
        Arc<dyn CandidateDirectoryPort>,
        Arc<dyn ContactCheckPort>,
        Arc<dyn VoteSubmissionPort>,
        Arc<dyn ResultsPort>,
    ) = if cfg.is_offline() {
        warn!("ELECTION_POLL_OFFLINE is set, using the in-memory poll API");
        let api = Arc::new(OfflinePollApi::new());
        (
            Arc::clone(&api) as Arc<dyn CandidateDirectoryPort>,
            Arc::clone(&api) as Arc<dyn ContactCheckPort>,
            Arc::clone(&api) as Arc<dyn VoteSubmissionPort>,
            api as Arc<dyn ResultsPort>,
        )
    } else {
        let api = Arc::new(
            HttpPollApi::new(&cfg.api_base_url_or_default(), cfg.request_timeout())
                .map_err(|e| anyhow::anyhow!("{}", e))?,
        );
        (
            Arc::clone(&api) as Arc<dyn CandidateDirectoryPort>,
            Arc::clone(&api) as Arc<dyn ContactCheckPort>,
            Arc::clone(&api) as Arc<dyn VoteSubmissionPort>,
            api as Arc<dyn ResultsPort>,
        )
    };

    // --- Services ---
    let ballot_ports = BallotPorts {
        directory,
        contacts,
        submissions,
    };
    let results_service = Arc::new(ResultsService::new(results));

    let settings = TuiSettings {
        theme: cfg.theme_or_default(),
        notice_ttl: cfg.notice_ttl(),
        refresh_interval: cfg.results_refresh(),
    };
    info!(
        refresh_secs = settings.refresh_interval.as_secs(),
        notice_secs = settings.notice_ttl.as_secs(),
        "terminal UI ready"
    );
    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        ballot_ports,
        results_service,
        settings,
    ));

    // --- Run (main menu -> Vote / Live results / Privacy policy) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
