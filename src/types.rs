//! Module containing all type definitions

use std::fmt;
use thiserror::Error;

/// AS Number
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct Asn(pub u32);

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Asn {
    fn from(asn: u32) -> Self {
        Asn(asn)
    }
}

/// IP Prefix (opaque identifier, compared as a plain string)
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone)]
pub struct Prefix(pub String);

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Prefix {
    fn from(prefix: &str) -> Self {
        Prefix(prefix.to_string())
    }
}

/// Simulation Errors
#[derive(Error, Debug)]
pub enum SimError {
    /// An input or output file could not be accessed
    #[error("Cannot access {0}: {1}")]
    FileError(String, #[source] std::io::Error),
    /// The CSV layer failed while reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    /// The relationship graph contains a customer-provider cycle
    #[error("Customer-provider cycle detected in AS relationships!")]
    CustomerProviderCycle,
    /// Propagation was aborted after hitting the iteration cap
    #[error("BGP propagation did not converge after {0} iterations!")]
    NoConvergence(usize),
}
