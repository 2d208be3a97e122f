//! Courier - relay generated content to a web platform on a fixed interval.
//!
//! Reads its configuration from the environment (a `.env` file is honoured),
//! opens one browser session through a WebDriver endpoint, and runs the
//! authenticate, fetch, publish cycle until interrupted.

use clap::Parser;
use courier_agent::{
    AgentContext, EXIT_CONFIG, EXIT_FAILURE, EXIT_OK, HttpContentFetcher, LoggingConfig,
    Scheduler, exit_status, init_logging,
};
use courier_core::{AgentSettings, Configuration};
use courier_driver::{AutomationDriver, ChromeOptions, WebDriverClient};
use courier_error::CourierError;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Command-line arguments for the agent.
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Relay generated content to a web platform on a schedule")]
#[command(version)]
struct Args {
    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Validate configuration and exit without opening a browser
    #[arg(long)]
    dry_run: bool,

    /// Emit JSON-formatted logs
    #[arg(long, env = "COURIER_JSON_LOGS")]
    json_logs: bool,

    /// Enable debug logging for the agent crates
    #[arg(short, long)]
    verbose: bool,

    /// Extra Chrome switch, e.g. --browser-arg=--window-size=1280,800
    #[arg(long = "browser-arg", value_name = "SWITCH")]
    browser_args: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is not an error.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let level = if args.verbose {
        "info,courier_agent=debug,courier_driver=debug"
    } else {
        "info"
    };
    let logging = LoggingConfig::new()
        .with_log_level(level)
        .with_json_logs(args.json_logs);
    if let Err(e) = init_logging(&logging) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(EXIT_FAILURE);
    }

    info!("Starting Courier");

    let (config, settings) = match load_configuration() {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(error = %e, "Configuration invalid");
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    info!(
        login_url = %config.login_url(),
        post_url = %config.post_url(),
        interval_minutes = *config.interval_minutes(),
        webdriver_url = %settings.webdriver_url(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("DRY RUN MODE - configuration valid, exiting");
        return ExitCode::from(EXIT_OK);
    }

    match run(config, settings, &args).await {
        Ok(()) => {
            info!("Courier stopped");
            ExitCode::from(EXIT_OK)
        }
        Err(e) => {
            error!(error = %e, "Courier halted");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn load_configuration() -> Result<(Configuration, AgentSettings), CourierError> {
    let config = Configuration::from_env()?;
    let settings = AgentSettings::from_env()?;
    Ok((config, settings))
}

async fn run(config: Configuration, settings: AgentSettings, args: &Args) -> Result<(), CourierError> {
    let source = HttpContentFetcher::new(config.generation_endpoint(), *settings.fetch_timeout())?;
    info!(endpoint = source.endpoint(), "Content fetcher ready");

    let options = args
        .browser_args
        .iter()
        .fold(ChromeOptions::default(), |options, arg| options.with_arg(arg.as_str()));
    let driver = WebDriverClient::connect(settings.webdriver_url(), &options)
        .await?
        .with_poll_interval(*settings.poll_interval());
    info!(session_id = driver.session_id(), "Browser session opened");
    let driver = Arc::new(driver);

    let scheduler = Scheduler::builder()
        .context(AgentContext::new(config, settings, driver.clone()))
        .source(Arc::new(source))
        .build()?;

    let outcome = if args.once {
        scheduler.run_once().await.map(|result| {
            info!(outcome = %result.outcome(), reason = %result.reason(), "Single cycle complete");
        })
    } else {
        scheduler
            .run(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            })
            .await
    };

    if let Err(e) = driver.close().await {
        warn!(error = %e, "Failed to close browser session");
    }
    outcome
}
