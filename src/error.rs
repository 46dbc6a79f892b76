use std::error::Error;

use rusoto_core::RusotoError;
use rusoto_rds::{
    DescribeDBSnapshotsError, ListTagsForResourceError, ModifyDBSnapshotAttributeError,
};
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq)]
pub enum SnapshotToolError {
    NoneValue,
    Config(String),
    InvalidPattern(regex::Error),
    PendingSnapshots(usize),
    DescribeSnapshotsError(RusotoError<DescribeDBSnapshotsError>),
    ListTagsError(RusotoError<ListTagsForResourceError>),
    ModifyAttributeError(RusotoError<ModifyDBSnapshotAttributeError>),
}

impl Display for SnapshotToolError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            SnapshotToolError::NoneValue => write!(f, "Value is None"),
            SnapshotToolError::Config(ref message) => write!(f, "Invalid configuration: {}", message),
            SnapshotToolError::InvalidPattern(ref error) => write!(f, "Invalid PATTERN: {}", error),
            SnapshotToolError::PendingSnapshots(pending) => {
                write!(f, "Could not share all snapshots. Pending: {}", pending)
            }
            SnapshotToolError::DescribeSnapshotsError(ref error) => Display::fmt(error, f),
            SnapshotToolError::ListTagsError(ref error) => Display::fmt(error, f),
            SnapshotToolError::ModifyAttributeError(ref error) => Display::fmt(error, f),
        }
    }
}

impl Error for SnapshotToolError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            SnapshotToolError::InvalidPattern(ref error) => Some(error),
            SnapshotToolError::DescribeSnapshotsError(ref error) => Some(error),
            SnapshotToolError::ListTagsError(ref error) => Some(error),
            SnapshotToolError::ModifyAttributeError(ref error) => Some(error),
            _ => None,
        }
    }
}

impl From<regex::Error> for SnapshotToolError {
    fn from(e: regex::Error) -> SnapshotToolError {
        SnapshotToolError::InvalidPattern(e)
    }
}

impl From<RusotoError<DescribeDBSnapshotsError>> for SnapshotToolError {
    fn from(e: RusotoError<DescribeDBSnapshotsError>) -> SnapshotToolError {
        SnapshotToolError::DescribeSnapshotsError(e)
    }
}

impl From<RusotoError<ListTagsForResourceError>> for SnapshotToolError {
    fn from(e: RusotoError<ListTagsForResourceError>) -> SnapshotToolError {
        SnapshotToolError::ListTagsError(e)
    }
}

impl From<RusotoError<ModifyDBSnapshotAttributeError>> for SnapshotToolError {
    fn from(e: RusotoError<ModifyDBSnapshotAttributeError>) -> SnapshotToolError {
        SnapshotToolError::ModifyAttributeError(e)
    }
}
