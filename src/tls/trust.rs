//! Trust resolution
//!
//! Unions the certificates and trust-store contents of a [`TrustConfig`]
//! into one set of trust anchors. The union is idempotent: the same
//! certificate supplied twice (directly, or through two stores) yields a
//! single anchor.

use std::collections::HashSet;

use log::debug;
use openssl::hash::MessageDigest;
use openssl::x509::store::{X509Store, X509StoreBuilder};
use openssl::x509::X509;

use crate::common::error::{TlsError, Result};
use crate::config::trust::TrustConfig;

/// The resolved trust-anchor set
pub struct ResolvedTrust {
    /// Verification store handed to the TLS context
    pub store: X509Store,
    /// The deduplicated anchors, advertised to clients as acceptable CAs
    pub anchors: Vec<X509>,
}

impl std::fmt::Debug for ResolvedTrust {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedTrust")
            .field("anchors", &self.anchors)
            .finish_non_exhaustive()
    }
}

/// Union all configured trust material into one anchor set
///
/// Callers skip this entirely for an empty config; the server then performs
/// no client-certificate verification.
pub fn resolve(config: &TrustConfig) -> Result<ResolvedTrust> {
    let mut anchors: Vec<X509> = Vec::new();
    let mut seen: HashSet<Vec<u8>> = HashSet::new();

    let mut collect = |cert: &X509| -> Result<()> {
        let fingerprint = cert
            .digest(MessageDigest::sha256())
            .map_err(TlsError::Ssl)?;
        if seen.insert(fingerprint.to_vec()) {
            anchors.push(cert.clone());
        }
        Ok(())
    };

    for cert in config.certificates() {
        collect(cert)?;
    }
    for store in config.trust_stores() {
        for cert in store.certificates() {
            collect(cert)?;
        }
    }

    if anchors.is_empty() {
        return Err(TlsError::Config(
            "trust configuration contains no certificates".to_string(),
        ));
    }

    debug!("Resolved {} trust anchor(s)", anchors.len());

    let mut builder = X509StoreBuilder::new().map_err(TlsError::Ssl)?;
    for cert in &anchors {
        builder.add_cert(cert.clone()).map_err(TlsError::Ssl)?;
    }

    Ok(ResolvedTrust {
        store: builder.build(),
        anchors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_trust_config_is_rejected() {
        let config = TrustConfig::new();
        let err = resolve(&config).unwrap_err();
        assert!(matches!(err, TlsError::Config(_)));
    }
}
