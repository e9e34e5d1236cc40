//! Identity resolution
//!
//! Normalizes the mutually exclusive loading strategies of an
//! [`IdentityConfig`] into a single resolved identity: the leaf certificate,
//! its chain, and the matching private key. Resolution reads and parses the
//! configured source once; nothing is cached.

use log::debug;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;

use crate::common::error::{TlsError, Result};
use crate::common::fs::{read_all, read_file};
use crate::common::resource::read_resource;
use crate::config::identity::{IdentityConfig, IdentitySource};
use crate::tls::material;

/// A resolved server identity
#[derive(Debug)]
pub struct ResolvedIdentity {
    /// Leaf certificate presented to clients
    pub cert: X509,
    /// Remaining chain certificates, leaf-adjacent first
    pub chain: Vec<X509>,
    /// Private key matching the leaf certificate
    pub key: PKey<Private>,
}

impl ResolvedIdentity {
    /// DNS names the certificate is valid for: subject alternative names
    /// plus the common name. Used by the SNI host check.
    pub fn dns_names(&self) -> Vec<String> {
        let mut names = Vec::new();

        if let Some(alt_names) = self.cert.subject_alt_names() {
            for entry in alt_names.iter() {
                if let Some(dns) = entry.dnsname() {
                    names.push(dns.to_string());
                }
            }
        }

        for entry in self.cert.subject_name().entries_by_nid(Nid::COMMONNAME) {
            if let Ok(common_name) = entry.data().as_utf8() {
                names.push(common_name.to_string());
            }
        }

        names
    }
}

/// Resolve the configured identity source, consuming it
///
/// Fails with [`TlsError::MissingIdentity`] when no source was configured.
pub fn resolve(config: &mut IdentityConfig) -> Result<ResolvedIdentity> {
    let source = config.take_source();
    debug!("Resolving identity from {} source", source.kind());

    match source {
        IdentitySource::None => Err(TlsError::MissingIdentity),

        IdentitySource::PemPath { cert, key, password } => {
            let cert_bytes = read_file(&cert)?;
            let key_bytes = read_file(&key)?;
            from_pem(&cert_bytes, &key_bytes, password.as_deref())
        }

        IdentitySource::PemResource { cert, key, password } => {
            let cert_bytes = read_resource(&cert)?;
            let key_bytes = read_resource(&key)?;
            from_pem(&cert_bytes, &key_bytes, password.as_deref())
        }

        IdentitySource::PemString { cert, key, password } => {
            from_pem(cert.as_bytes(), key.as_bytes(), password.as_deref())
        }

        IdentitySource::PemReader {
            mut cert,
            mut key,
            password,
        } => {
            let cert_bytes = read_all(cert.as_mut())?;
            let key_bytes = read_all(key.as_mut())?;
            from_pem(&cert_bytes, &key_bytes, password.as_deref())
        }

        IdentitySource::KeystorePath { path, password } => {
            let bytes = read_file(&path)
                .map_err(|e| TlsError::KeyStore(format!("cannot read keystore: {}", e)))?;
            from_keystore(&bytes, &password)
        }

        IdentitySource::KeystoreResource { name, password } => {
            let bytes = read_resource(&name)?;
            from_keystore(&bytes, &password)
        }

        IdentitySource::KeystoreReader {
            mut reader,
            password,
        } => {
            let bytes = read_all(reader.as_mut())?;
            from_keystore(&bytes, &password)
        }
    }
}

fn from_pem(cert_bytes: &[u8], key_bytes: &[u8], password: Option<&str>) -> Result<ResolvedIdentity> {
    let mut chain = material::parse_cert_chain_pem(cert_bytes)?;
    let cert = chain.remove(0);
    let key = material::parse_private_key(key_bytes, password)?;

    Ok(ResolvedIdentity { cert, chain, key })
}

fn from_keystore(bytes: &[u8], password: &str) -> Result<ResolvedIdentity> {
    let identity = material::parse_keystore(bytes, password)?;

    Ok(ResolvedIdentity {
        cert: identity.cert,
        chain: identity.chain,
        key: identity.key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::identity::IdentityConfig;

    #[test]
    fn test_unconfigured_identity_is_missing() {
        let mut config = IdentityConfig::new();
        let err = resolve(&mut config).unwrap_err();
        assert!(matches!(err, TlsError::MissingIdentity));
    }

    #[test]
    fn test_garbage_pem_string() {
        let mut config = IdentityConfig::new();
        config.pem_from_string("not a cert", "not a key").unwrap();
        let err = resolve(&mut config).unwrap_err();
        assert!(matches!(err, TlsError::CertificateParse(_)));
    }

    #[test]
    fn test_missing_pem_resource() {
        let mut config = IdentityConfig::new();
        config
            .pem_from_resource("missing-cert.pem", "missing-key.pem")
            .unwrap();
        let err = resolve(&mut config).unwrap_err();
        assert!(matches!(err, TlsError::InvalidResourceLocation(_)));
    }

    #[test]
    fn test_missing_keystore_path_is_keystore_error() {
        let mut config = IdentityConfig::new();
        config
            .keystore_from_path("/definitely/not/here.p12", "password")
            .unwrap();
        let err = resolve(&mut config).unwrap_err();
        assert!(matches!(err, TlsError::KeyStore(_)));
    }
}
