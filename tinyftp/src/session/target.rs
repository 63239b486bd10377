//! # Target
//!
//! Server address given to `connect`

use crate::regex::URL_RE;
use crate::types::{FtpError, FtpResult};

const FTP_PORT: u16 = 21;
const FTPS_PORT: u16 = 990;

/// Where to connect, and whether the control connection is secured from the start (implicit FTPS)
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub host: String,
    pub port: u16,
    pub secure: bool,
}

impl Target {
    /// Parse `[ftp://|ftps://]host[:port][/path]`.
    ///
    /// The port is taken from `port` if given, then from the address, then defaults to 21 (990 for `ftps://`).
    /// Any path is ignored.
    pub fn parse(address: &str, port: Option<u16>) -> FtpResult<Self> {
        let address = address.trim();
        let caps = URL_RE
            .captures(address)
            .ok_or_else(|| FtpError::InvalidUrl(address.to_string()))?;
        let secure = caps
            .get(1)
            .is_some_and(|scheme| scheme.as_str().eq_ignore_ascii_case("ftps"));
        let host = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|host| host.as_str().to_string())
            .ok_or_else(|| FtpError::InvalidUrl(address.to_string()))?;
        let url_port = match caps.get(4) {
            Some(port) => Some(
                port.as_str()
                    .parse::<u16>()
                    .map_err(|_| FtpError::InvalidUrl(address.to_string()))?,
            ),
            None => None,
        };
        let default_port = if secure { FTPS_PORT } else { FTP_PORT };

        Ok(Self {
            host,
            port: port.or(url_port).unwrap_or(default_port),
            secure,
        })
    }
}
