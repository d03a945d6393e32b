//! Available supported DNS providers.

pub mod cloudflare;
mod error;

pub use error::{Error, Provider};
