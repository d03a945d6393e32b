//! Implementation for using with the Cloudflare API v4.

mod models;

use models::Envelope;
pub use models::{ApiError, DnsRecord, UpdateRequest, Zone, RECORD_TYPE_A};

use super::error::{Error, Provider};
use crate::error::{Error as ErrorCommon, ExternalService};

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Method;
use isahc::config::Configurable;
use isahc::{AsyncBody, AsyncReadResponseExt};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, warn};
use url::Url;

const API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Permissions that credentials must have over a zone for updating its
/// records.
const REQUIRED_PERMISSIONS: [&str; 2] = ["#dns_records:read", "#dns_records:edit"];

/// The DNS A record updater for the Cloudflare provider.
pub struct Updater {
    /// The account email sent in the `X-Auth-Email` header.
    email: String,
    /// The API token sent as bearer token. It must never be logged.
    token: String,
    /// The API base URL to use.
    base_url: Url,
    /// The HTTP client that the instance use for making the requests.
    http_cli: isahc::HttpClient,
}

impl fmt::Debug for Updater {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_struct("Updater")
            .field("email", &self.email)
            .field("token", &"<REDACTED>")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl Updater {
    /// Creates a Cloudflare updater which authenticates with the specified
    /// account email and API token.
    pub fn new(email: &str, token: &str) -> Result<Self, Error> {
        Self::with_base_url(email, token, API_BASE_URL)
    }

    /// Creates a Cloudflare updater using the specified API base URL.
    /// This constructor is mainly useful for testing purposes.
    pub(crate) fn with_base_url(email: &str, token: &str, base_url: &str) -> Result<Self, Error> {
        if email.is_empty() {
            return Err(ErrorCommon::invalid_arguments("email", "email cannot be empty").into());
        }

        if token.is_empty() {
            return Err(ErrorCommon::invalid_arguments("token", "API token cannot be empty").into());
        }

        let base_url = match Url::parse(base_url) {
            Ok(u) if !u.cannot_be_a_base() => u,
            Ok(_) => {
                return Err(ErrorCommon::invalid_arguments(
                    "base_url",
                    "API base URL must be an URL which can have a path",
                )
                .into())
            }
            Err(err) => {
                return Err(ErrorCommon::invalid_arguments(
                    "base_url",
                    &format!("API base URL is invalid: {}", err),
                )
                .into())
            }
        };

        let http_cli = isahc::HttpClientBuilder::new()
            .max_connections(1)
            .connection_cache_size(1)
            .connection_cache_ttl(Duration::from_secs(5))
            .timeout(crate::REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ErrorCommon::internal("HTTP client initialization error", err.into()))?;

        Ok(Self {
            email: String::from(email),
            token: String::from(token),
            base_url,
            http_cli,
        })
    }

    /// Returns the first zone of the account whose name is `name`.
    pub async fn zone(&self, name: &str) -> Result<Zone, Error> {
        let zones: Vec<Zone> = self
            .send(Method::GET, self.endpoint(&["zones"]), None)
            .await?;
        debug!(zones = zones.len(), "listed account zones");

        let zone = zones
            .into_iter()
            .find(|z| z.name == name)
            .ok_or_else(|| {
                Error::Provider(Provider::ZoneNotFound {
                    zone: String::from(name),
                })
            })?;

        debug!(zone = %zone.name, id = %zone.id, status = %zone.status, "found zone");
        Ok(zone)
    }

    /// Returns the ID of the first zone of the account whose name is `name`.
    pub async fn zone_id(&self, name: &str) -> Result<String, Error> {
        Ok(self.zone(name).await?.id)
    }

    /// Returns the first A record of the zone identified by `zone_id` whose
    /// name is `name`. Records of other types with the same name are ignored.
    pub async fn record_a(&self, zone_id: &str, name: &str) -> Result<DnsRecord, Error> {
        let records: Vec<DnsRecord> = self
            .send(
                Method::GET,
                self.endpoint(&["zones", zone_id, "dns_records", ""]),
                None,
            )
            .await?;
        debug!(records = records.len(), "listed zone DNS records");

        let record = records
            .into_iter()
            .find(|r| r.name == name && r.kind == RECORD_TYPE_A)
            .ok_or_else(|| {
                Error::Provider(Provider::RecordNotFound {
                    record: String::from(name),
                })
            })?;

        debug!(
            record = %record.name,
            id = %record.id,
            content = %record.content,
            ttl = ?record.ttl,
            proxied = ?record.proxied,
            "found DNS A record"
        );
        Ok(record)
    }

    /// Overwrites `record`, which belongs to the zone identified by `zone_id`,
    /// for pointing to `ip` with automatic TTL.
    /// Only the success flag of the response is checked; its result is ignored.
    pub async fn update_record_a(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        ip: Ipv4Addr,
    ) -> Result<(), Error> {
        let req = UpdateRequest::record_a(&record.name, ip);
        let body = serde_json::to_vec(&req).map_err(|err| {
            ErrorCommon::internal("error while serializing the update request", err.into())
        })?;

        self.send_checked(
            Method::PUT,
            self.endpoint(&["zones", zone_id, "dns_records", record.id.as_str()]),
            Some(body),
        )
        .await?;

        Ok(())
    }

    /// Checks that the credentials can read and edit the DNS records of the
    /// zone named `name` and returns it.
    ///
    /// Cloudflare doesn't report the zone permissions for every kind of
    /// credentials; when they aren't reported the check passes with a warning.
    pub async fn check_zone_access(&self, name: &str) -> Result<Zone, Error> {
        let zone = self.zone(name).await?;

        match missing_permissions(&zone) {
            None => warn!(
                zone = %zone.name,
                "Cloudflare didn't report the zone permissions, they cannot be verified"
            ),
            Some(missing) if !missing.is_empty() => {
                return Err(Error::Provider(Provider::MissingPermissions {
                    zone: zone.name,
                    missing,
                }))
            }
            Some(_) => {}
        }

        Ok(zone)
    }

    /// Returns the URL resulting of appending `segments` to the API base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // The constructor guarantees that the base URL can be a base.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        url
    }

    /// Sends an authenticated request and returns the result of the API
    /// response envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<T, Error> {
        let body = self.send_checked(method, url, body).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|err| {
            Error::Provider(Provider::Service(ExternalService::InvalidResponse {
                reason: format!(
                    "Cloudflare has responded successfully with an unexpected result ({})",
                    err
                ),
            }))
        })?;

        envelope.result.ok_or_else(|| {
            Error::Provider(Provider::Service(ExternalService::InvalidResponse {
                reason: String::from("Cloudflare has responded successfully without any result"),
            }))
        })
    }

    /// Sends an authenticated request and returns the response body once it's
    /// verified that Cloudflare marked it as successful.
    /// Unsuccessful responses are mapped to `Provider::Rejected` with the
    /// errors that it reported, whatever the shape of their result is.
    async fn send_checked(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<String, Error> {
        debug!(method = method.as_str(), url = %url, "sending request to Cloudflare");

        let request = isahc::Request::builder()
            .method(method)
            .uri(url.as_str())
            .header("X-Auth-Email", self.email.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, "application/json")
            .body(body.map(AsyncBody::from).unwrap_or_else(AsyncBody::empty))
            .map_err(|err| {
                ErrorCommon::internal("error while building the HTTP request", err.into())
            })?;

        let mut response = self
            .http_cli
            .send_async(request)
            .await
            .map_err(Error::from_isahc)?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            ErrorCommon::internal("error while reading the response body as text", err.into())
        })?;

        let envelope: Envelope<IgnoredAny> = match serde_json::from_str(&body) {
            Ok(e) => e,
            Err(_) if status.is_server_error() => {
                return Err(Error::Provider(Provider::Service(ExternalService::Internal {
                    reason: format!(
                        r#"Cloudflare has responded with an HTTP "{}" status code"#,
                        status,
                    ),
                })))
            }
            Err(err) => {
                return Err(Error::Provider(Provider::Service(
                    ExternalService::InvalidResponse {
                        reason: format!(
                            r#"Cloudflare has responded with an HTTP "{}" status code and a body which isn't an API response ({})"#,
                            status, err,
                        ),
                    },
                )))
            }
        };

        if !envelope.success {
            return Err(Error::Provider(Provider::Rejected {
                errors: envelope.errors,
            }));
        }

        Ok(body)
    }
}

/// Returns the required permissions that `zone` doesn't grant, or `None` when
/// the zone doesn't report its permissions.
fn missing_permissions(zone: &Zone) -> Option<Vec<String>> {
    let granted = zone.permissions.as_ref()?;
    Some(
        REQUIRED_PERMISSIONS
            .iter()
            .filter(|p| !granted.iter().any(|g| g.as_str() == **p))
            .map(|p| String::from(*p))
            .collect(),
    )
}
