//! Implementation for using with the "ip-api" geolocation service.

use super::{Error, PublicIpv4};
use crate::error::{BoxError, Error as ErrorCommon, ExternalService, NetworkSide};

use std::net::Ipv4Addr;
use std::str::FromStr;

use async_trait::async_trait;
use isahc::config::Configurable;
use isahc::AsyncReadResponseExt;
use serde::Deserialize;
use tracing::debug;

/// Value of the status field when the service resolved the IP.
const STATUS_SUCCESS: &str = "success";

/// The information that "ip-api" returns about the IP which performs the
/// request.
/// Only `query` and `status` are used for finding out the public IP, the rest
/// of fields are only logged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IpInfo {
    /// The IP address.
    pub query: String,
    /// `success` or `fail`.
    pub status: String,
    /// Explanation of the failure when status is `fail`.
    pub message: Option<String>,
    /// Country name.
    pub country: String,
    /// Two-letter country code (ISO 3166-1 alpha-2).
    pub country_code: String,
    /// Region or state name.
    pub region_name: String,
    /// City name.
    pub city: String,
    /// Time zone, e.g. `Europe/Madrid`.
    pub timezone: String,
    /// Internet service provider name.
    pub isp: String,
    /// Organization name.
    pub org: String,
    /// Autonomous system number and organization, e.g. `AS15169 Google LLC`.
    #[serde(rename = "as")]
    pub as_name: String,
}

/// The public IP finder for the "ip-api" service.
pub struct Finder {
    /// The API URL to request the IP information.
    url: String,
    /// The HTTP client that the instance use for making the requests.
    http_cli: isahc::HttpClient,
}

impl Finder {
    /// Creates an "ip-api" finder.
    pub fn new() -> Result<Self, Error> {
        Self::with_url("http://ip-api.com/json/")
    }

    /// Creates an "ip-api" finder using the specified URL.
    /// This constructor is mainly useful for testing purposes.
    pub(crate) fn with_url(url: &str) -> Result<Self, Error> {
        let http_cli = isahc::HttpClientBuilder::new()
            .max_connections(1)
            .timeout(crate::REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ErrorCommon::internal("HTTP client initialization error", err.into()))?;

        Ok(Self {
            url: String::from(url),
            http_cli,
        })
    }

    /// Gets the information of the public IP where the machine is running
    /// behind.
    /// The information is returned as the service reported it, hence it may
    /// have a `fail` status.
    pub async fn info(&self) -> Result<IpInfo, Error> {
        let mut response = self
            .http_cli
            .get_async(self.url.as_str())
            .await
            .map_err(Error::from_isahc)?;

        if response.status() != http::StatusCode::OK {
            if response.status().is_server_error() {
                return Err(Error::Finder(ExternalService::Internal {
                    reason: format!(
                        r#"ip-api service has responded with an HTTP "{}" status code (expected 200)"#,
                        response.status(),
                    ),
                }));
            }

            if response.status() == http::StatusCode::TOO_MANY_REQUESTS {
                return Err(Error::Common(ErrorCommon::network(
                    BoxError::from(
                        r#"ip-api service has returned "429 Too Many Requests" HTTP status code"#,
                    ),
                    NetworkSide::Client,
                    true,
                )));
            }

            return Err(Error::Finder(ExternalService::InvalidResponse {
                reason: format!(
                    r#"ip-api service has responded with an HTTP "{}" status code (expected 200)"#,
                    response.status(),
                ),
            }));
        }

        let body = response.text().await.map_err(|err| {
            Error::Common(ErrorCommon::internal(
                "error while reading the response body as text",
                BoxError::from(err),
            ))
        })?;

        serde_json::from_str(&body).map_err(|err| {
            Error::Finder(ExternalService::InvalidResponse {
                reason: format!("ip-api response body isn't valid: {}", err),
            })
        })
    }
}

#[async_trait]
impl PublicIpv4 for Finder {
    async fn ipv4(&self) -> Result<Ipv4Addr, Error> {
        let info = self.info().await?;

        if info.status != STATUS_SUCCESS {
            let reason = match info.message {
                Some(msg) => format!("could not get IP address: {}", msg),
                None => String::from("could not get IP address"),
            };
            return Err(Error::Finder(ExternalService::Failed { reason }));
        }

        debug!(
            ip = %info.query,
            country = %info.country,
            country_code = %info.country_code,
            region = %info.region_name,
            city = %info.city,
            timezone = %info.timezone,
            isp = %info.isp,
            org = %info.org,
            asn = %info.as_name,
            "ip-api resolved the public IP"
        );

        Ipv4Addr::from_str(&info.query).map_err(|_| {
            Error::Finder(ExternalService::InvalidResponse {
                reason: format!(r#"ip-api returned "{}", which isn't an IP V4"#, info.query),
            })
        })
    }
}
