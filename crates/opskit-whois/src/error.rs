use std::time::Duration;

use thiserror::Error;

/// Errors produced by WHOIS queries
#[derive(Error, Debug)]
pub enum WhoisError {
    /// No response within the per-attempt deadline
    #[error("whois query timed out after {0:?}")]
    Timeout(Duration),

    /// Connection or transfer failure
    #[error("whois query failed: {0}")]
    Io(#[from] std::io::Error),
}
