//! Available supported IP public finders.

mod error;
pub mod ip_api;
pub mod ipify;

pub use error::Error;

use std::net::Ipv4Addr;

use async_trait::async_trait;

/// Each implementation facilitate to find out the public IP V4 of the machine
/// using a specific IP public finder service.
#[async_trait]
pub trait PublicIpv4 {
    /// Gets the IP V4 public IP of the machine.
    async fn ipv4(&self) -> Result<Ipv4Addr, Error>;
}
