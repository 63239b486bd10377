#![crate_name = "tinyftp"]
#![crate_type = "lib"]

//! # tinyftp
//!
//! tinyftp is a small blocking FTP client with optional FTPS support.
//!
//! - Passive mode data connections, a new one for every transfer
//! - Directory listings through `MLSD` when the server supports it, `LIST` otherwise, with a parser for
//!   Unix `ls -l` and Windows/IIS style output
//! - Implicit FTPS (`ftps://` addresses) through [native-tls](https://github.com/sfackler/rust-native-tls)
//!   or [rustls](https://github.com/rustls/rustls)
//!
//! ## Get started
//!
//! To get started, first add **tinyftp** to your dependencies:
//!
//! ```toml
//! tinyftp = "^0.3"
//! ```
//!
//! ### Features
//!
//! #### SSL/TLS Support
//!
//! If you want to enable **support for FTPS**, you must enable the `native-tls` or `rustls` feature in your cargo
//! dependencies, based on the TLS provider you prefer.
//!
//! ```toml
//! tinyftp = { version = "^0.3", features = ["native-tls"] }
//! # or
//! tinyftp = { version = "^0.3", features = ["rustls"] }
//! ```
//!
//! ## Usage
//!
//! Here is a basic usage example:
//!
//! ```rust,no_run
//! use tinyftp::FtpClient;
//!
//! let mut client = FtpClient::new();
//! client.connect("ftp://127.0.0.1:10021", None).unwrap();
//! client.login("test", "test").unwrap();
//! for entry in client.list(None).unwrap() {
//!     println!("{} ({} bytes)", entry.name(), entry.size());
//! }
//! client.put("hello.txt", b"hello world\r\n").unwrap();
//! let content = client.get("hello.txt").unwrap();
//! assert_eq!(content, b"hello world\r\n");
//!
//! // Disconnect from server
//! assert!(client.quit().is_ok());
//! ```
//!
//! ## FTPS
//!
//! Give the client a TLS connector, then connect to an `ftps://` address.
//! The control connection is secured from the start, and data connections are protected too
//! when the server agrees to it.
//!
//! ```rust,ignore
//! use tinyftp::{NativeTlsConnector, NativeTlsFtpClient};
//! use tinyftp::native_tls::TlsConnector;
//!
//! let mut client = NativeTlsFtpClient::new()
//!     .with_tls(NativeTlsConnector::from(TlsConnector::new().unwrap()));
//! client.connect("ftps://ftp.example.org", None).unwrap();
//! client.login("demo", "password").unwrap();
//! assert!(client.quit().is_ok());
//! ```

#![doc(html_playground_url = "https://play.rust-lang.org")]

// -- common deps
#[macro_use]
extern crate lazy_regex;
#[macro_use]
extern crate log;

// -- private
pub(crate) mod command;
mod regex;
mod session;
mod status;
#[cfg(test)]
mod test_server;

// -- public
pub mod list;
pub mod types;

// -- secure deps
#[cfg(feature = "native-tls")]
pub extern crate native_tls_crate as native_tls;
#[cfg(feature = "rustls")]
pub extern crate rustls_crate as rustls;

// -- export session
pub use session::{DataStream, ImplFtpClient, NoTlsStream, PassiveStreamBuilder, TlsStream};
// -- export secure
#[cfg(feature = "secure")]
pub use session::TlsConnector;
#[cfg(feature = "native-tls")]
pub use session::{NativeTlsConnector, NativeTlsStream};
#[cfg(feature = "rustls")]
pub use session::{RustlsConnector, RustlsStream};
// -- export (common)
pub use list::{DirEntry, ListingFormat};
pub use status::{ReplyClass, Status};
pub use types::{FileType, FtpError, FtpResult, Reply};

/// A session without TLS support
pub type FtpClient = ImplFtpClient<NoTlsStream>;

/// A session which can reach `ftps://` servers through native-tls
#[cfg(feature = "native-tls")]
#[cfg_attr(docsrs, doc(cfg(feature = "native-tls")))]
pub type NativeTlsFtpClient = ImplFtpClient<NativeTlsStream>;

/// A session which can reach `ftps://` servers through rustls
#[cfg(feature = "rustls")]
#[cfg_attr(docsrs, doc(cfg(feature = "rustls")))]
pub type RustlsFtpClient = ImplFtpClient<RustlsStream>;

// -- test logging
#[cfg(test)]
pub fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
