//! Command-line interface.

use clap::{ArgEnum, Args, Parser, Subcommand};
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;
use std::net::Ipv4Addr;

/// Command-line tool for keeping a DNS A record hosted in Cloudflare pointing
/// to the public IP of the machine that executes it.
///
/// Every option can also be set through the environment variable indicated
/// in its help.
#[derive(Parser)]
#[clap(author, name = "cloudflare-dns-updater", version)]
pub struct App {
    /// Maximum level of the log messages printed to the standard error.
    #[clap(
        long,
        global = true,
        arg_enum,
        env = "DNS_UPDATER_LOG",
        default_value = "info"
    )]
    pub log_level: LogLevel,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Update the DNS A record when it doesn't point to the public IP.
    ///
    /// It uses the passed IP otherwise the public IP of this machine revealed
    /// by the indicated finder.
    Update {
        #[clap(flatten)]
        credentials: Credentials,

        /// Name of the zone (domain) which contains the record.
        #[clap(long, env = "CLOUDFLARE_ZONE")]
        zone: DomainName,

        /// Name of the A record to update; it must belong to the zone.
        #[clap(long, env = "CLOUDFLARE_RECORD")]
        record: DomainName,

        /// Finder to use for revealing the public IP.
        #[clap(short = 'f', long, arg_enum, default_value = "ip-api")]
        finder: Finder,

        /// IP to set instead of revealing the public IP with the finder.
        #[clap(long)]
        ip: Option<Ipv4Addr>,

        /// Look up everything but don't update the record.
        #[clap(long)]
        dry_run: bool,
    },
    /// Check that the credentials can read and edit the DNS records of the
    /// zone.
    Check {
        #[clap(flatten)]
        credentials: Credentials,

        /// Name of the zone (domain) to check.
        #[clap(long, env = "CLOUDFLARE_ZONE")]
        zone: DomainName,
    },
}

/// Cloudflare account credentials.
#[derive(Args)]
pub struct Credentials {
    /// Email of the Cloudflare account.
    #[clap(long, env = "CLOUDFLARE_EMAIL")]
    pub email: String,

    /// Cloudflare API token.
    #[clap(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub api_token: String,
}

/// Supported public IP finders.
#[derive(ArgEnum, Clone, Debug, PartialEq)]
pub enum Finder {
    IpApi,
    Ipify,
}

/// Supported log levels.
#[derive(ArgEnum, Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// A fully qualified domain name without the trailing dot, normalized to
/// lowercase.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainName(String);

impl DomainName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for DomainName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref RE: Regex = Regex::new(
                r"(?i)^(\*\.)?([a-z0-9_]([a-z0-9_\-]{0,61}[a-z0-9_])?\.)*[a-z0-9]([a-z0-9\-]{0,61}[a-z0-9])?$"
            )
            .unwrap();
        }

        if s.is_empty() {
            return Err(String::from("a domain name cannot be empty"));
        }

        if s.len() > 253 || !RE.is_match(s) {
            return Err(format!(
                "'{}' isn't a valid domain name; labels can only contain 'a-z', '0-9', '-' and '_' case insensitive characters, they cannot be empty, only the first one can be the '*' wildcard and a trailing dot isn't accepted",
                s
            ));
        }

        Ok(Self(s.to_lowercase()))
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(&self.0)
    }
}
