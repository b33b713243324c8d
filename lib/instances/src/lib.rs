pub use anyhow::Result;

use std::fmt;
use fnv::FnvHashMap as Map;

#[derive(Debug, Copy, Clone)]
enum Error {
    UnknownInstanceName,
    IndexOutOfRange,
}


impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for Error {}

/// Problems with the input records.  Any of these aborts loading; there is no partial instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    MissingField { table: &'static str, line: usize, field: &'static str },
    MalformedField { table: &'static str, line: usize, field: &'static str, value: String },
    /// The row could not be read at all (bad quoting, invalid UTF-8).
    MalformedRow { table: &'static str, line: usize, message: String },
    InvalidStride { table: &'static str },
    DuplicateId { table: &'static str, id: String },
    ArrivalBeforeDeparture { flight: String },
    AnchorCollision { base: String },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::MissingField { table, line, field } =>
              write!(f, "{} line {}: missing field `{}`", table, line, field),
            DataError::MalformedField { table, line, field, value } =>
              write!(f, "{} line {}: cannot parse `{}` from {:?}", table, line, field, value),
            DataError::MalformedRow { table, line, message } =>
              write!(f, "{} line {}: {}", table, line, message),
            DataError::InvalidStride { table } =>
              write!(f, "{} stride must be positive", table),
            DataError::DuplicateId { table, id } =>
              write!(f, "duplicate {} id {:?}", table, id),
            DataError::ArrivalBeforeDeparture { flight } =>
              write!(f, "flight {} arrives before it departs", flight),
            DataError::AnchorCollision { base } =>
              write!(f, "flight id {:?} collides with the base anchor of the same name", base),
        }
    }
}

impl std::error::Error for DataError {}


pub mod dataset;
pub mod raw;

mod parsers;
