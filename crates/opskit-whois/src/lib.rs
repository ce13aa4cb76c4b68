//! opskit-whois: WHOIS over TCP and RADb route prefix collection.
//!
//! [`query`] sends a single WHOIS query and reads the raw response bytes,
//! retrying with backoff on connection failures and timeouts.
//! [`radb_prefixes_by_asn`] queries the RADb mirror for all `route:` and
//! `route6:` objects originated by an ASN.

mod client;
mod error;
mod radb;

pub use client::{query, QueryOptions, DEFAULT_PORT, DEFAULT_TIMEOUT};
pub use error::WhoisError;
pub use radb::{radb_prefixes_by_asn, PrefixCollection, RadbOptions, RADB_HOSTNAME};
