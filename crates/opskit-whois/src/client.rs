//! Plain WHOIS query over TCP with retries

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::WhoisError;

/// Standard WHOIS port
pub const DEFAULT_PORT: u16 = 43;

/// Per-attempt deadline used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(250);

/// Options for [`query`]. Zero-valued fields fall back to their defaults.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// WHOIS server hostname
    pub hostname: String,
    /// Server port; 0 means [`DEFAULT_PORT`]
    pub port: u16,
    /// Query string, sent followed by CRLF
    pub query: String,
    /// Per-attempt deadline; zero means [`DEFAULT_TIMEOUT`]
    pub timeout: Duration,
    /// Number of attempts before giving up; 0 means 3
    pub attempts: u32,
}

/// Send a WHOIS query and read the full response.
///
/// Failed attempts are retried with a doubling delay between them; the
/// error of the last attempt is returned if all of them fail.
pub async fn query(opts: &QueryOptions) -> Result<Vec<u8>, WhoisError> {
    let port = if opts.port == 0 { DEFAULT_PORT } else { opts.port };
    let deadline = if opts.timeout.is_zero() {
        DEFAULT_TIMEOUT
    } else {
        opts.timeout
    };
    let attempts = if opts.attempts == 0 {
        DEFAULT_ATTEMPTS
    } else {
        opts.attempts
    };

    let mut delay = RETRY_BASE_DELAY;
    let mut last_err = None;

    for attempt in 1..=attempts {
        match timeout(deadline, query_once(&opts.hostname, port, &opts.query)).await {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(err)) => last_err = Some(WhoisError::Io(err)),
            Err(_) => last_err = Some(WhoisError::Timeout(deadline)),
        }

        if attempt < attempts {
            tracing::debug!(
                hostname = %opts.hostname,
                attempt,
                "whois query failed, retrying"
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }
    }

    Err(last_err.unwrap_or(WhoisError::Timeout(deadline)))
}

async fn query_once(hostname: &str, port: u16, query: &str) -> std::io::Result<Vec<u8>> {
    let mut stream = TcpStream::connect((hostname, port)).await?;

    stream.write_all(query.as_bytes()).await?;
    stream.write_all(b"\r\n").await?;

    // WHOIS servers close the connection after the response
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;

    Ok(response)
}
