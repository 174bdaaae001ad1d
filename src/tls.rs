//! TLS configuration for the exchange connection.
//!
//! Builds a [`rustls::ClientConfig`] backed by the Mozilla root store
//! (`webpki-roots`). OKX fronts `ws.okx.com` with rotating public CAs, so
//! the trust anchors are not pinned to a single issuer.

use rustls::ClientConfig;

/// Builds a [`ClientConfig`] that trusts the bundled Mozilla root set and
/// performs full certificate verification with SNI.
#[must_use]
pub fn build_tls_config() -> ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}
