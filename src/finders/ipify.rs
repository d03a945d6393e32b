//! Implementation for using with "ipify" services.

use super::{Error, PublicIpv4};
use crate::error::{BoxError, Error as ErrorCommon, ExternalService, NetworkSide};

use std::net::Ipv4Addr;
use std::str::FromStr;

use async_trait::async_trait;
use isahc::config::Configurable;
use isahc::AsyncReadResponseExt;

/// The public IP finder for the "ipify" provider.
pub struct Finder {
    /// The API base URL to request the public IP V4.
    base_url_v4: String,
    /// The HTTP client that the instance use for making the requests.
    http_cli: isahc::HttpClient,
}

impl Finder {
    /// Creates an "ipify" finder.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url("https://api.ipify.org")
    }

    /// Creates an "ipify" finder using the specified base URL.
    /// This constructor is mainly useful for testing purposes.
    fn with_base_url(base_url_v4: &str) -> Result<Self, Error> {
        let http_cli = isahc::HttpClientBuilder::new()
            .max_connections(1)
            .timeout(crate::REQUEST_TIMEOUT)
            .build()
            .map_err(|err| ErrorCommon::internal("HTTP client initialization error", err.into()))?;

        Ok(Self {
            base_url_v4: String::from(base_url_v4),
            http_cli,
        })
    }

    /// Sends a request to `url` and map errors and some response HTTP status
    /// codes to errors according the ipify API.
    async fn send_request(&self, url: &str) -> Result<isahc::Response<isahc::AsyncBody>, Error> {
        let response = self
            .http_cli
            .get_async(url)
            .await
            .map_err(Error::from_isahc)?;

        if response.status() != http::StatusCode::OK {
            if response.status().is_server_error() {
                return Err(Error::Finder(ExternalService::Internal {
                    reason: format!(
                        r#"ipify service has responded with an HTTP "{}" status code (expected 200)"#,
                        response.status(),
                    ),
                }));
            }

            if response.status() == http::StatusCode::BAD_REQUEST {
                return Err(Error::Common(ErrorCommon::network(
                    BoxError::from(
                        r#"ipify service has returned "400 Bad Request" HTTP status code"#,
                    ),
                    NetworkSide::Client,
                    true,
                )));
            }

            return Err(Error::Finder(ExternalService::InvalidResponse {
                reason: format!(
                    r#"ipify service has responded with an HTTP "{}" status code (expected 200)"#,
                    response.status(),
                ),
            }));
        }

        Ok(response)
    }
}

#[async_trait]
impl PublicIpv4 for Finder {
    async fn ipv4(&self) -> Result<Ipv4Addr, Error> {
        let mut response = self.send_request(&self.base_url_v4).await?;
        let body = response.text().await.map_err(|err| {
            Error::Common(ErrorCommon::internal(
                "error while reading the response body as text",
                BoxError::from(err),
            ))
        })?;

        Ipv4Addr::from_str(body.trim()).map_err(|_| {
            Error::Finder(ExternalService::InvalidResponse {
                reason: format!(
                    r#"ipify service has responded with a 200 HTTP status code but "{}" is not a valid IP V4"#,
                    body
                ),
            })
        })
    }
}
