//! Rejections a universe can return.
//!
//! Every error aborts the whole call; nothing a universe owns changes when an
//! operation returns `Err`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::collaborators::CollaboratorError;

/// The three conserved quantities a universe accounts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    RepAvailableForExtraBondPayouts,
    ExtraDisputeBondRemainingToBePaidOut,
    OpenInterest,
}

impl Counter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RepAvailableForExtraBondPayouts => "rep available for extra bond payouts",
            Self::ExtraDisputeBondRemainingToBePaidOut => {
                "extra dispute bond remaining to be paid out"
            }
            Self::OpenInterest => "open interest",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniverseError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("not contained: {0}")]
    NotContained(&'static str),
    #[error("forking market is already set")]
    AlreadyForking,
    #[error("universe is already initialized")]
    AlreadyInitialized,
    #[error("universe is not forking")]
    NotForking,
    #[error("timestamp arithmetic overflowed")]
    TimestampOverflow,
    #[error("{counter} would underflow: balance {balance}, decrease {amount}")]
    CounterUnderflow {
        counter: Counter,
        balance: u128,
        amount: u128,
    },
    #[error("{counter} would overflow: balance {balance}, increase {amount}")]
    CounterOverflow {
        counter: Counter,
        balance: u128,
        amount: u128,
    },
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Coarse classification of a rejection, stable across message wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    Forbidden,
    NotContained,
    AlreadyForking,
    AlreadyInitialized,
    NotForking,
    Arithmetic,
    Collaborator,
}

impl UniverseError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotContained(_) => ErrorKind::NotContained,
            Self::AlreadyForking => ErrorKind::AlreadyForking,
            Self::AlreadyInitialized => ErrorKind::AlreadyInitialized,
            Self::NotForking => ErrorKind::NotForking,
            Self::TimestampOverflow
            | Self::CounterUnderflow { .. }
            | Self::CounterOverflow { .. } => ErrorKind::Arithmetic,
            Self::Collaborator(_) => ErrorKind::Collaborator,
        }
    }
}
