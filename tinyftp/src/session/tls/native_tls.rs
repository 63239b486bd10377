//! # Native tls
//!
//! Native tls implementation of TLS types

use std::net::TcpStream;

use native_tls::{TlsConnector as NativeConnector, TlsStream as NativeStream};

use super::{TlsConnector, TlsStream};
use crate::{FtpError, FtpResult};

#[derive(Debug)]
/// A Wrapper for the tls connector
pub struct NativeTlsConnector {
    connector: NativeConnector,
}

impl From<NativeConnector> for NativeTlsConnector {
    fn from(connector: NativeConnector) -> Self {
        Self { connector }
    }
}

impl TlsConnector for NativeTlsConnector {
    type Stream = NativeTlsStream;

    fn connect(&self, domain: &str, stream: TcpStream) -> FtpResult<Self::Stream> {
        self.connector
            .connect(domain, stream)
            .map(NativeTlsStream::from)
            .map_err(|e| FtpError::SecureError(e.to_string()))
    }
}

/// Tls stream wrapper, shutting the TLS session down when dropped.
#[derive(Debug)]
pub struct NativeTlsStream {
    stream: NativeStream<TcpStream>,
}

impl From<NativeStream<TcpStream>> for NativeTlsStream {
    fn from(stream: NativeStream<TcpStream>) -> Self {
        Self { stream }
    }
}

impl TlsStream for NativeTlsStream {
    type InnerStream = NativeStream<TcpStream>;

    fn get_ref(&self) -> &TcpStream {
        self.stream.get_ref()
    }

    fn mut_ref(&mut self) -> &mut Self::InnerStream {
        &mut self.stream
    }
}

impl Drop for NativeTlsStream {
    fn drop(&mut self) {
        if let Err(err) = self.stream.shutdown() {
            error!("Failed to shutdown stream: {}", err);
        } else {
            debug!("TLS Stream shut down");
        }
    }
}
