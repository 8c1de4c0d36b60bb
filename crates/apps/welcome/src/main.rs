//! Welcome - launch router for the Cosmos mail client
//!
//! Picks the first screen (account setup, single-pane list or dual-pane
//! list/detail) for a launch request and prints it.

use std::sync::Arc;

use anyhow::{Result, bail};
use log::{error, info};
use mail::{Activation, LaunchRequest, LaunchSettings};

mod app;
mod host;
mod runtime;

use app::WelcomeApp;
use host::ConsoleHost;

const USAGE: &str = "\
Usage: welcome [KEY=VALUE ...]
       welcome cosmos://welcome?KEY=VALUE&...

Keys:
  ACCOUNT_ID       account to open
  MAILBOX_ID       mailbox to open (-2 for the combined inbox)
  DEBUG_PANE_MODE  1 forces single pane, 2 forces dual pane

Without arguments the app is started as from the launcher.";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return Ok(());
    }
    let request = parse_request(&args)?;

    let settings = LaunchSettings::load()?;
    info!("Launching {:?} on a {:?} screen", request, settings.screen_size);
    let app = WelcomeApp::open(settings)?;

    let result = run(&app, &request).await;
    app.shutdown();
    result
}

async fn run(app: &WelcomeApp, request: &LaunchRequest) -> Result<()> {
    let host = Arc::new(ConsoleHost::new(std::io::stdout()));
    if app.launch(request, host.clone()).await? == Activation::Routing {
        return Ok(());
    }

    let imported = app.complete_upgrade().await?;
    info!("Upgrade imported {} account(s), relaunching", imported);
    app.launch(request, host).await?;
    Ok(())
}

/// Build the launch request from the command line
fn parse_request(args: &[String]) -> Result<LaunchRequest> {
    match args {
        [] => Ok(LaunchRequest::start()),
        [uri] if uri.contains("://") => Ok(LaunchRequest::from_uri(uri)?),
        _ => {
            let mut extras = Vec::with_capacity(args.len());
            for arg in args {
                let Some((key, value)) = arg.split_once('=') else {
                    bail!("Unexpected argument {:?}\n\n{}", arg, USAGE);
                };
                extras.push((key, value));
            }
            Ok(LaunchRequest::from_extras(extras))
        }
    }
}
