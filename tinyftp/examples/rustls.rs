//! To run this example enable the rustls feature (--features rustls).
//! If you use this code in your own project you need to enable tinyftp's
//! rustls feature through Cargo.toml and also include the webpki-roots crate
//! as a dependency (this includes Mozilla's root certificates for use with
//! rustls).

use std::sync::Arc;

use tinyftp::rustls::{ClientConfig, RootCertStore};
use tinyftp::{RustlsConnector, RustlsFtpClient};

fn main() {
    let root_store = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    // Connect through implicit FTPS and authenticate.
    let mut client =
        RustlsFtpClient::new().with_tls(RustlsConnector::from(Arc::new(config)));
    client.connect("ftps://test.rebex.net", None).unwrap();
    client.login("demo", "password").unwrap();

    for entry in client.list(None).unwrap() {
        println!("{} {}", entry.name(), entry.size());
    }

    // Terminate the connection to the server.
    let _ = client.quit();
}
