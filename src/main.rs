mod console;

use chrono::Utc;
use collector::Collector;
use exporter::{output_filename, persist, PersistOutcome};
use harvest_core::{CoreError, ErrorExt, ErrorReporter, HarvestConfig, SETTINGS_FILE};
use reddit_client::RedditSession;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_CONFIG_REJECTED: u8 = 1;
const EXIT_PERSIST_FAILED: u8 = 2;

const DEFAULT_LOG_FILTER: &str =
    "reddit_harvest=info,harvest_core=info,reddit_client=info,collector=info,exporter=info";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting reddit-harvest");
    let reporter = ErrorReporter::new();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            reporter.report_error(&e);
            console::print_config_rejected(&e.user_friendly_message());
            return ExitCode::from(EXIT_CONFIG_REJECTED);
        }
    };

    console::print_intro(&config);

    let session = match RedditSession::new(&config.credentials, &config.user_agent) {
        Ok(session) => session,
        Err(e) => {
            reporter.report_error(&e);
            console::print_error(&e.user_friendly_message());
            return ExitCode::FAILURE;
        }
    };

    let collector = Collector::new(session).with_pacing(config.pacing);
    let result = collector.collect(&config.community, config.limit).await;
    console::print_collection_summary(&result);

    if result.is_empty() {
        console::print_nothing_collected();
        return ExitCode::SUCCESS;
    }

    let path = config
        .output_dir
        .join(output_filename(&config.community, Utc::now()));

    match persist(&result.records, &path) {
        Ok(PersistOutcome::Written { path, records }) => {
            console::print_saved(&path, records);
            console::print_compliance_reminder();
            console::print_ready(&path);
            ExitCode::SUCCESS
        }
        Ok(PersistOutcome::Skipped) => {
            console::print_nothing_collected();
            ExitCode::SUCCESS
        }
        Err(e) => {
            reporter.report_error(&e);
            console::print_error(&e.user_friendly_message());
            ExitCode::from(EXIT_PERSIST_FAILED)
        }
    }
}

fn load_config() -> Result<HarvestConfig, CoreError> {
    let config = HarvestConfig::default().with_settings_file(Path::new(SETTINGS_FILE))?;
    config.validate()?;
    Ok(config)
}
