use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use navigator::{BackButton, BackControl, Navigator, SessionHub};
use rising_portal::config::{ConfigError, PortalConfig, Variant};
use rising_portal::services::auth::AdminAuth;
use rising_portal::services::store::MemoryStore;
use rising_portal::shell::{Outcome, Shell};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum PortalError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("stdin read failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "portal", about = "Rising Academy portal, headless front end")]
struct Cli {
    /// Front end to emulate: web or mobile.
    #[arg(long, env = "PORTAL_VARIANT")]
    variant: Option<Variant>,

    /// Splash screen duration in milliseconds.
    #[arg(long, env = "PORTAL_BOOTSTRAP_DELAY_MS")]
    bootstrap_delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "portal failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), PortalError> {
    let mut config = PortalConfig::from_env()?;
    if let Some(variant) = cli.variant {
        config.variant = variant;
    }
    if let Some(ms) = cli.bootstrap_delay_ms {
        config.bootstrap_delay = Duration::from_millis(ms);
    }

    let hub = SessionHub::new();
    let auth = Arc::new(AdminAuth::new(config.admin.clone(), hub.clone()));
    let store = Arc::new(MemoryStore::new());
    let back_button = config.variant.has_back_gesture().then(BackButton::new);
    let back = back_button.clone().map(|b| Arc::new(b) as Arc<dyn BackControl>);

    let navigator = Navigator::new(config.navigator_options(), back);
    navigator.start(&hub);
    tracing::info!(variant = ?config.variant, delay = ?config.bootstrap_delay, "portal ready");

    // Echo page changes the user did not type, such as the splash timeout.
    let mut pages = navigator.subscribe_pages();
    let echo = tokio::spawn(async move {
        while pages.changed().await.is_ok() {
            let page = *pages.borrow_and_update();
            eprintln!("-> {page} ({})", page.title());
        }
    });

    let shell = Shell::new(navigator.clone(), auth, store, back_button);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match shell.execute(&line).await {
            Ok(Outcome::Print(text)) if text.is_empty() => {}
            Ok(Outcome::Print(text)) => println!("{text}"),
            Ok(Outcome::Quit) => break,
            Err(e) => eprintln!("{e}"),
        }
    }

    navigator.shutdown();
    echo.abort();
    Ok(())
}
