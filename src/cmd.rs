//! Commands that the command-line tool executes.

pub mod check;
pub mod update;

use crate::error as common;
use crate::finders;
use crate::providers;

use std::error as stderr;
use std::fmt;

/// The error type returned by the commands. It wraps the error of the
/// component which failed.
#[derive(Debug)]
pub enum Error {
    /// The command was executed with invalid settings.
    Arguments(common::Error),
    /// The DNS provider failed.
    Provider(providers::Error),
    /// The public IP finder failed.
    Finder(finders::Error),
}

impl From<common::Error> for Error {
    fn from(err: common::Error) -> Self {
        Error::Arguments(err)
    }
}

impl From<providers::Error> for Error {
    fn from(err: providers::Error) -> Self {
        Error::Provider(err)
    }
}

impl From<finders::Error> for Error {
    fn from(err: finders::Error) -> Self {
        Error::Finder(err)
    }
}

impl stderr::Error for Error {
    fn source(&self) -> Option<&(dyn stderr::Error + 'static)> {
        match self {
            Error::Arguments(a) => a.source(),
            Error::Provider(p) => p.source(),
            Error::Finder(f) => f.source(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            Error::Arguments(a) => a.fmt(f),
            Error::Provider(p) => write!(f, "DNS provider: {}", p),
            Error::Finder(fe) => write!(f, "public IP finder: {}", fe),
        }
    }
}
