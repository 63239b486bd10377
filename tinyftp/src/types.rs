//! # Types
//!
//! Error type, server replies and the set of values for FTP commands

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use super::status::{ReplyClass, Status};

/// A shorthand for a Result whose error type is always an FtpError.
pub type FtpResult<T> = std::result::Result<T, FtpError>;

/// `FtpError` is a library-global error type to describe the different kinds of
/// errors that might occur while using FTP.
#[derive(Debug, Error)]
pub enum FtpError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(std::io::Error),
    /// Failed to read or write a file on the local file system
    #[error("Local file error: {0}")]
    LocalIo(std::io::Error),
    /// There was an error with the secure stream
    #[error("Secure error: {0}")]
    SecureError(String),
    /// A secure connection was requested, but no TLS support is available
    #[error("TLS support is not available for this client")]
    TlsUnavailable,
    /// The operation requires a connection to the server
    #[error("Not connected to any server")]
    NotConnected,
    /// Unexpected response from remote. The command expected a certain response, but got another one.
    /// This means the ftp server refused to perform your request or there was an error while processing it.
    /// Contains the reply data.
    #[error("Invalid response: {0}")]
    UnexpectedResponse(Reply),
    /// The response syntax is invalid
    #[error("Response contains an invalid syntax")]
    BadResponse,
    /// The address provided was invalid
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
    /// Less bytes than expected went through the data connection
    #[error("Incomplete transfer: expected {expected} bytes, transferred {actual}")]
    IncompleteTransfer { expected: u64, actual: u64 },
}

/// Defines a reply from the ftp server.
///
/// `code` is zero when no usable reply could be read from the control connection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub code: u32,
    pub message: String,
}

/// File Type used in `TYPE` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// ASCII text, non-print format control
    Ascii,
    /// Image (binary)
    Binary,
}

/// Features returned by FEAT command (key, maybe value)
pub type Features = HashMap<String, Option<String>>;

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message.trim_end())
    }
}

impl Reply {
    /// Instantiates a new `Reply`
    pub fn new(code: u32, message: impl ToString) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }

    /// The reply that stands for "nothing could be read"
    pub fn unusable() -> Self {
        Self::default()
    }

    /// Get the well known status for this reply code
    pub fn status(&self) -> Status {
        Status::from(self.code)
    }

    /// Get the completion class of this reply
    pub fn class(&self) -> ReplyClass {
        ReplyClass::from_code(self.code)
    }

    /// Whether this reply is a positive completion (2xx)
    pub fn is_completion(&self) -> bool {
        self.class() == ReplyClass::Completion
    }

    /// Whether nothing usable could be read
    pub fn is_unusable(&self) -> bool {
        self.class() == ReplyClass::Unusable
    }

    /// Succeed with this reply if it belongs to `class`
    pub(crate) fn expect_class(self, class: ReplyClass) -> FtpResult<Self> {
        if self.class() == class {
            Ok(self)
        } else {
            Err(FtpError::UnexpectedResponse(self))
        }
    }

    /// Succeed with this reply if its code is exactly `status`
    pub(crate) fn expect_status(self, status: Status) -> FtpResult<Self> {
        if self.code == status.code() {
            Ok(self)
        } else {
            Err(FtpError::UnexpectedResponse(self))
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileType::Ascii => write!(f, "A"),
            FileType::Binary => write!(f, "I"),
        }
    }
}
