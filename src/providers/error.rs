//! Defines an error which any "provider" implementation must return.
//! The error type extends the [common error type](crate::error) to provide
//! kinds of errors to their specific domain.

use super::cloudflare::ApiError;
use crate::error::{Error as ErrorCommon, ExternalService};

use std::error as stderr;
use std::fmt;

use isahc::error::Error as IsahcError;

/// The error type to wrap the errors returned by the [providers and its
/// descendants modules](crate::providers).
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Common error kinds which are shared across all the modules of this
    /// crate.
    Common(ErrorCommon),
    /// Identifies error returned by the provider.
    Provider(Provider),
}

impl Error {
    /// Convenient constructor for creating the appropriated Error from the
    /// Error type of the isahc module.
    pub(super) fn from_isahc(err: IsahcError) -> Self {
        use isahc::error::ErrorKind;

        match err.kind() {
            ErrorKind::BadServerCertificate
            | ErrorKind::InvalidContentEncoding
            | ErrorKind::ProtocolViolation
            | ErrorKind::TooManyRedirects => {
                Error::Provider(Provider::Service(ExternalService::Internal {
                    reason: err.to_string(),
                }))
            }
            _ => Error::Common(ErrorCommon::from_isahc(err)),
        }
    }
}

impl From<ErrorCommon> for Error {
    fn from(err: ErrorCommon) -> Self {
        Error::Common(err)
    }
}

impl stderr::Error for Error {
    fn source(&self) -> Option<&(dyn stderr::Error + 'static)> {
        match self {
            Error::Common(c) => c.source(),
            Error::Provider(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::Common(c) => c.fmt(f),
            Error::Provider(p) => p.fmt(f),
        }
    }
}

#[derive(Debug, PartialEq)]
/// An error returned by the provider when performing a requested operation.
pub enum Provider {
    /// The provider responded but the response tells that it has failed or
    /// it isn't what its API documents.
    Service(ExternalService),
    /// The provider rejected the request and explained why.
    Rejected {
        /// Errors as reported by the provider.
        errors: Vec<ApiError>,
    },
    /// The account doesn't have any zone with the given name.
    ZoneNotFound {
        /// Name of the zone.
        zone: String,
    },
    /// The zone doesn't have any A record with the given name.
    RecordNotFound {
        /// Name of the record.
        record: String,
    },
    /// The credentials lack permissions required to manage the zone records.
    MissingPermissions {
        /// Name of the zone.
        zone: String,
        /// Permissions which weren't granted.
        missing: Vec<String>,
    },
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Provider::Service(es) => es.fmt(f),
            Provider::Rejected { errors } => {
                write!(f, "provider rejected the request")?;
                if errors.is_empty() {
                    return write!(f, " without reporting any error");
                }

                for (i, e) in errors.iter().enumerate() {
                    let sep = if i == 0 { ": " } else { "; " };
                    write!(f, "{}{}", sep, e)?;
                }
                Ok(())
            }
            Provider::ZoneNotFound { zone } => write!(f, "could not find zone {}", zone),
            Provider::RecordNotFound { record } => {
                write!(f, "could not find DNS A record {}", record)
            }
            Provider::MissingPermissions { zone, missing } => write!(
                f,
                "credentials lack permissions over zone {}: {}",
                zone,
                missing.join(", ")
            ),
        }
    }
}
