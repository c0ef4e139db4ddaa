//! Activewear Crawler - storefront product and fabric details extractor
//!
//! Crawls activewear storefronts, extracts product records with a focus on
//! fabric composition, and exports them to CSV and JSON.

// Module declarations
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

use std::io;
use std::process::ExitCode;
use tracing::{error, warn};

use application::{CrawlUseCases, RunMode, RunSummary};
use cli::{FAILURE_GUIDANCE, MenuOutcome};
use infrastructure::config::{AppConfig, ConfigManager};
use infrastructure::logging::init_logging_with_config;

const RULE: &str = "============================================================";

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    Completed,
    Exited,
    Interrupted,
    Failed,
}

impl RunStatus {
    fn code(self) -> u8 {
        match self {
            Self::Completed | Self::Exited => 0,
            Self::Interrupted | Self::Failed => 1,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Next step after the menu: crawl, or stop with a message
#[derive(Debug, PartialEq, Eq)]
enum MenuDecision {
    Crawl(RunMode),
    Stop(RunStatus, &'static str),
}

fn decide(outcome: MenuOutcome) -> MenuDecision {
    match outcome {
        MenuOutcome::Run(mode) => MenuDecision::Crawl(mode),
        MenuOutcome::Exit => MenuDecision::Stop(RunStatus::Exited, "Exiting..."),
        MenuOutcome::Invalid(choice) => {
            warn!("Invalid menu choice: {:?}", choice);
            MenuDecision::Stop(RunStatus::Exited, "⚠️  Invalid choice!")
        }
        MenuOutcome::NoSelection => MenuDecision::Stop(RunStatus::Exited, "⚠️  No brands selected!"),
    }
}

fn crawl_status<T>(result: &anyhow::Result<T>) -> RunStatus {
    match result {
        Ok(_) => RunStatus::Completed,
        Err(_) => RunStatus::Failed,
    }
}

/// Load configuration, falling back to defaults when the config directory is unusable
async fn load_config() -> AppConfig {
    let loaded = match ConfigManager::new() {
        Ok(manager) => manager.load_config().await,
        Err(e) => Err(e),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("⚠️  Using default configuration: {e:#}");
        AppConfig::default()
    })
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn report_interrupt() -> ExitCode {
    println!("\n\n⚠️  Crawl interrupted by user");
    RunStatus::Interrupted.into()
}

fn report_failure(e: &anyhow::Error) -> ExitCode {
    error!("Run failed: {:#}", e);
    eprintln!("\n\n❌ Error occurred: {e:#}");
    eprintln!("{FAILURE_GUIDANCE}");
    RunStatus::Failed.into()
}

fn report_success(summary: &RunSummary) {
    println!("\n{RULE}");
    println!("✅ CRAWL COMPLETED SUCCESSFULLY!");
    println!("📊 Total products extracted: {}", summary.total_products);
    println!("🧵 With fabric details: {}", summary.with_fabric_details);
    for path in [&summary.files.csv, &summary.files.json].into_iter().flatten() {
        println!("📁 {}", path.display());
    }
    if summary.total_products == 0 {
        println!("📁 No output files written");
    }
    println!("{RULE}");
}

async fn crawl(config: &AppConfig, mode: &RunMode) -> anyhow::Result<RunSummary> {
    println!("\nInitializing crawler...");
    let use_cases = CrawlUseCases::from_config(config)?;
    println!("\n🚀 Starting {mode}...");
    use_cases.run(mode).await
}

/// Menu-driven entry point
///
/// Exit code 0 on completion or explicit exit, 1 on interrupt or failure.
pub async fn run() -> ExitCode {
    let config = load_config().await;
    if let Err(e) = init_logging_with_config(config.logging.clone()) {
        eprintln!("⚠️  Logging disabled: {e:#}");
    }

    let menu = tokio::task::spawn_blocking(|| {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        cli::prompt_run_mode(&mut input, &mut output)
    });

    let outcome = tokio::select! {
        joined = menu => match joined {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => return report_failure(&anyhow::Error::new(e).context("Failed to read menu choice")),
            Err(e) => return report_failure(&anyhow::Error::new(e).context("Menu task failed")),
        },
        _ = interrupted() => return report_interrupt(),
    };

    let mode = match decide(outcome) {
        MenuDecision::Crawl(mode) => mode,
        MenuDecision::Stop(status, message) => {
            println!("\n{message}");
            return status.into();
        }
    };

    tokio::select! {
        result = crawl(&config, &mode) => {
            let status = crawl_status(&result);
            match result {
                Ok(summary) => report_success(&summary),
                Err(e) => return report_failure(&e),
            }
            status.into()
        },
        _ = interrupted() => report_interrupt(),
    }
}
