//! Defines an error which any "finders" implementation must return.
//! The error type extends the [common error type](crate::error) to provide
//! kinds of errors to their specific domain.

use crate::error::{Error as ErrorCommon, ExternalService};

use std::error as stderr;
use std::fmt;

use isahc::error::Error as IsahcError;

/// The error type to wrap the errors returned by the [finders and its
/// descendants modules](crate::finders).
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Common error kinds which are shared across all the modules of this
    /// crate.
    Common(ErrorCommon),
    /// Identifies error returned by the finder.
    Finder(ExternalService),
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
            | ErrorKind::TooManyRedirects => Error::Finder(ExternalService::Internal {
                reason: err.to_string(),
            }),
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
            Error::Finder(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::Common(c) => c.fmt(f),
            Error::Finder(es) => es.fmt(f),
        }
    }
}
