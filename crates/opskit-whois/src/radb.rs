//! RADb route object collection by origin ASN

use std::sync::LazyLock;
use std::time::Duration;

use regex::bytes::Regex;

use crate::client::{query, QueryOptions};
use crate::error::WhoisError;

/// The RADb WHOIS mirror
pub const RADB_HOSTNAME: &str = "whois.radb.net";

static ROUTE4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^route:\s+([0-9./]+)$").unwrap());
static ROUTE6_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^route6:\s+([0-9a-fA-F:/]+)$").unwrap());

/// IPv4 and IPv6 prefixes extracted from a RADb response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixCollection {
    pub ipv4: Vec<String>,
    pub ipv6: Vec<String>,
}

/// Options for [`radb_prefixes_by_asn`]
#[derive(Debug, Clone)]
pub struct RadbOptions {
    /// Origin ASN, e.g. "AS64500"
    pub asn: String,
    /// Per-attempt deadline; zero means the client default
    pub timeout: Duration,
}

/// Query RADb for every route object originated by `asn` and collect the
/// announced prefixes. An unknown ASN yields an empty collection.
pub async fn radb_prefixes_by_asn(opts: &RadbOptions) -> Result<PrefixCollection, WhoisError> {
    let response = query(&QueryOptions {
        hostname: RADB_HOSTNAME.to_string(),
        query: format!("-i origin {}", opts.asn),
        timeout: opts.timeout,
        ..Default::default()
    })
    .await?;

    Ok(parse_prefixes(&response))
}

fn parse_prefixes(response: &[u8]) -> PrefixCollection {
    let mut result = PrefixCollection::default();

    for caps in ROUTE4_RE.captures_iter(response) {
        if let Some(m) = caps.get(1) {
            result.ipv4.push(String::from_utf8_lossy(m.as_bytes()).into_owned());
        }
    }

    for caps in ROUTE6_RE.captures_iter(response) {
        if let Some(m) = caps.get(1) {
            result.ipv6.push(String::from_utf8_lossy(m.as_bytes()).into_owned());
        }
    }

    result
}
