//! opskit-format: small string formatting utilities.
//!
//! Delimiter-splitting helpers and AWS ARN rewrites used at the edges of
//! the system; none of the core depends on this crate.

mod aws;

pub use aws::{ec2_instance_id_from_arn, ecs_task_arn_to_cluster_arn};

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*[,\s]+\s*").unwrap());

/// Errors produced by the parsing helpers
#[derive(Error, Debug)]
pub enum FormatError {
    /// A delimited field did not parse as an integer
    #[error("invalid integer: {0}")]
    InvalidInt(#[from] std::num::ParseIntError),
}

/// Split a string on runs of commas and/or whitespace, dropping empty
/// fields.
pub fn split_by_delimiter(input: &str) -> Vec<String> {
    SPLIT_RE
        .split(input)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a string of delimited numbers and parse each as an integer
pub fn split_ints_by_delimiter(input: &str) -> Result<Vec<i64>, FormatError> {
    split_by_delimiter(input)
        .iter()
        .map(|s| s.parse::<i64>().map_err(FormatError::from))
        .collect()
}
