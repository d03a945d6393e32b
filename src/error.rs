//! Defines a common error type that exposes kinds of errors that any submodule
//! may return.
//! Every submodule that talks to an external service creates a specific error
//! type to define the kinds of errors of its specific domain and wraps this
//! one for the kinds that are shared.

use std::error as stderr;
use std::fmt;

use isahc::error::Error as IsahcError;

/// Convenient type for making more concise wrapping the standard error trait
/// object into a Box.
pub type BoxError = Box<dyn stderr::Error + Send + Sync>;

/// The error type that expose general kinds of errors that are common to all
/// the modules of this crate.
#[non_exhaustive]
#[derive(Debug)]
pub enum Error {
    /// Identify unexpected errors which happen because of the state of the
    /// system where the application is running, for example, insufficient
    /// resources, OS failures, etc.
    Internal(Internal),
    /// Identify errors due to invalid arguments passed to function or methods
    /// or assigned values to configurations.
    InvalidArguments(Args),
    /// Identify errors related with the network produced by the client or
    /// server side and informs if the operation could succeed if it's retried.
    /// NOTE this tool never retries; the hint is only reported to the user.
    Network(Network),
}

impl Error {
    /// Convenient constructor for creating an InvalidArguments Error.
    /// See [`Args`] documentation to know about the convention for the value of
    /// the `names` parameter.
    pub(crate) fn invalid_arguments(names: &str, msg: &str) -> Self {
        Self::InvalidArguments(Args::new(names, msg))
    }

    /// Convenient constructor for creating a Network Error.
    pub(crate) fn network(origin: BoxError, side: NetworkSide, should_retry: bool) -> Self {
        Self::Network(Network {
            side,
            should_retry,
            inner: origin,
        })
    }

    /// Convenient constructor for creating an Internal Error.
    pub(crate) fn internal(ctx_msg: &'static str, error: BoxError) -> Self {
        Self::Internal(Internal { ctx_msg, error })
    }

    /// Maps the isahc error kinds which are related with the network or with
    /// the local client.
    ///
    /// Error kinds which reveal a misbehaving service (certificates, content
    /// encoding, protocol violations) aren't classified here; each service
    /// module maps those first because they belong to its own domain.
    pub(crate) fn from_isahc(err: IsahcError) -> Self {
        use isahc::error::ErrorKind;

        let side = if err.is_client() {
            NetworkSide::Client
        } else {
            NetworkSide::Server
        };

        match err.kind() {
            ErrorKind::ConnectionFailed | ErrorKind::Timeout => {
                Error::network(err.into(), side, true)
            }
            ErrorKind::Io => {
                let should_retry = side == NetworkSide::Server;
                Error::network(err.into(), side, should_retry)
            }
            // NameResolution error is returned indicating that's a server
            // side error when the host name cannot be resolved, but we
            // don't consider it that should be a server side error, hence
            // we always indicate that's a client side error.
            ErrorKind::NameResolution => Error::network(err.into(), NetworkSide::Client, false),
            ErrorKind::BadClientCertificate
            | ErrorKind::ClientInitialization
            | ErrorKind::InvalidCredentials
            | ErrorKind::TlsEngine => Error::network(err.into(), side, false),
            _ => Error::internal("HTTP client failed to perform the request", err.into()),
        }
    }
}

impl stderr::Error for Error {
    fn source(&self) -> Option<&(dyn stderr::Error + 'static)> {
        match self {
            Error::InvalidArguments { .. } => None,
            Error::Internal(i) => i.source(),
            Error::Network(n) => n.source(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::InvalidArguments(a) => a.fmt(f),
            Error::Internal(i) => i.fmt(f),
            Error::Network(n) => n.fmt(f),
        }
    }
}

/// Represents invalid arguments error regarding the business domain.
#[derive(Debug)]
pub struct Args {
    /// `names` is one or several parameters names; it has several conventions
    /// for expressing the involved parameters.
    ///
    /// * When a specific parameter is invalid its value is the exact parameter
    ///   name.
    /// * when the parameter is struct, the invalid fields can be
    ///   __optionally__ indicated using curly brackets (e.g invalid field:
    ///   `config{zone}`).
    /// * When several parameters are invalid, its value is the parameters names
    ///   wrapped in round brackets (e.g. `(zone,record)`).
    pub names: String,
    /// `msg` is a human friendly message that explains why the argument(s) are
    /// invalid.
    pub msg: String,
}

impl Args {
    pub(crate) fn new(names: &str, msg: &str) -> Self {
        Args {
            names: String::from(names),
            msg: String::from(msg),
        }
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(
            f,
            "{} arguments have invalid values. {}",
            self.names, self.msg
        )
    }
}

#[derive(Debug)]
/// An unexpected error which happens due to the state of the system where the
/// application is running; for example, insufficient resources, OS failure,
/// hardware failure, etc.
pub struct Internal {
    /// A human friendly message to provide context of the error.
    pub ctx_msg: &'static str,
    /// The received error which cannot be handled by the application and get
    /// wrapped by this instance.
    pub(crate) error: BoxError,
}

impl stderr::Error for Internal {
    fn source(&self) -> Option<&(dyn stderr::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

impl fmt::Display for Internal {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.ctx_msg)
    }
}

/// An error caused by the network when performing a requested operation.
#[derive(Debug)]
pub struct Network {
    /// The side which originated the error.
    pub side: NetworkSide,
    /// Tells if the same operation could succeed if it's performed again.
    pub should_retry: bool,
    pub(crate) inner: BoxError,
}

impl stderr::Error for Network {
    fn source(&self) -> Option<&(dyn stderr::Error + 'static)> {
        Some(self.inner.as_ref())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        let retry = if self.should_retry { "yes" } else { "no" };
        write!(
            f,
            "Network error produced by the {} side (should retry operation: {})",
            self.side, retry,
        )
    }
}

/// Indicates the network side which originated the error.
#[derive(Debug, PartialEq)]
pub enum NetworkSide {
    /// Indicates that the error is in the client side.
    Client,
    /// Indicates that the error is in the server side.
    Server,
}

impl fmt::Display for NetworkSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            NetworkSide::Client => write!(f, "client"),
            NetworkSide::Server => write!(f, "server"),
        }
    }
}

#[derive(Debug, PartialEq)]
/// An error caused by an external service (DNS provider, public IP finder,
/// etc.) when performing a requested operation.
pub enum ExternalService {
    /// Indicates that the service has returned an internal error.
    Internal {
        /// Explains what the service returned.
        reason: String,
    },
    /// Indicates that the service has responded with something that doesn't
    /// match the format of its API.
    InvalidResponse {
        /// Explains what doesn't match.
        reason: String,
    },
    /// Indicates that the service has responded that it couldn't perform the
    /// requested operation.
    Failed {
        /// The explanation given by the service.
        reason: String,
    },
}

impl fmt::Display for ExternalService {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            ExternalService::Internal { reason } => {
                write!(f, "service had an internal error: {}", reason)
            }
            ExternalService::InvalidResponse { reason } => {
                write!(f, "service responded with an unexpected response: {}", reason)
            }
            ExternalService::Failed { reason } => {
                write!(f, "service reported a failure: {}", reason)
            }
        }
    }
}
