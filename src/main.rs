//! Command-line tool entry point.

#![deny(missing_docs)]

use clap::Parser;
use std::error::Error as StdError;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error};

mod cli;
mod cmd;
mod error;
mod finders;
mod providers;

use cmd::update::Outcome;
use finders::{ip_api, ipify, PublicIpv4};
use providers::cloudflare::Updater;

/// Maximum time that any HTTP request to an external service can take.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let app_args = cli::App::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(app_args.log_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(app_args.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", report(&err));
            ExitCode::FAILURE
        }
    }
}

/// Executes the command selected by the user.
async fn run(command: cli::Command) -> Result<(), cmd::Error> {
    match command {
        cli::Command::Update {
            credentials,
            zone,
            record,
            finder,
            ip,
            dry_run,
        } => {
            let updater = Updater::new(&credentials.email, &credentials.api_token)?;
            let finder: Box<dyn PublicIpv4> = match finder {
                cli::Finder::IpApi => Box::new(ip_api::Finder::new()?),
                cli::Finder::Ipify => Box::new(ipify::Finder::new()?),
            };

            let settings = cmd::update::Settings {
                zone: zone.as_str(),
                record: record.as_str(),
                ip,
                dry_run,
            };

            match cmd::update::execute(&updater, finder.as_ref(), &settings).await? {
                Outcome::Unchanged { ip } => debug!(%ip, "update command finished, no changes"),
                Outcome::Updated { previous, ip } => {
                    debug!(%previous, %ip, "update command finished, record updated")
                }
                Outcome::DryRun { previous, ip } => {
                    debug!(%previous, %ip, "update command finished, dry run")
                }
            }
        }
        cli::Command::Check { credentials, zone } => {
            let updater = Updater::new(&credentials.email, &credentials.api_token)?;
            cmd::check::execute(&updater, zone.as_str()).await?;
        }
    }

    Ok(())
}

/// Formats `err` followed by the chain of errors which caused it.
fn report(err: &dyn StdError) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }

    msg
}
