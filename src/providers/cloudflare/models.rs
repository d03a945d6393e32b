//! Shapes of the Cloudflare API v4 request and response bodies used by the
//! updater. Fields that the updater doesn't use are left out; serde ignores
//! them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The DNS record type managed by the updater.
pub const RECORD_TYPE_A: &str = "A";

/// TTL value that Cloudflare interprets as "automatic".
pub const TTL_AUTOMATIC: u32 = 1;

/// Wrapper of every Cloudflare API v4 response.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    pub result: Option<T>,
}

/// An error reported by Cloudflare. It may carry a chain of errors which
/// caused it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiError {
    /// Cloudflare error code.
    pub code: i64,
    /// Human readable description.
    pub message: String,
    /// Errors which caused this one, in order.
    #[serde(default)]
    pub error_chain: Vec<ApiError>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "[{}] {}", self.code, self.message)?;
        for cause in &self.error_chain {
            write!(f, " <- {}", cause)?;
        }

        Ok(())
    }
}

/// A zone (registered domain) of the account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: String,
    /// Permissions granted to the credentials over the zone. Cloudflare only
    /// reports them for some kinds of credentials.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// A DNS record of a zone.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub proxied: Option<bool>,
}

/// Body of the request which overwrites a DNS record.
#[derive(Debug, PartialEq, Serialize)]
pub struct UpdateRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub name: &'a str,
    pub content: String,
    pub ttl: u32,
}

impl<'a> UpdateRequest<'a> {
    /// Creates the request which points the A record named `name` to `ip`
    /// with automatic TTL.
    pub fn record_a(name: &'a str, ip: std::net::Ipv4Addr) -> Self {
        Self {
            kind: RECORD_TYPE_A,
            name,
            content: ip.to_string(),
            ttl: TTL_AUTOMATIC,
        }
    }
}
