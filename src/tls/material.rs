//! Cryptographic material parsing
//!
//! Byte-level parsing shared by the identity and trust resolvers: PEM
//! certificate chains, PEM private keys (optionally encrypted), PKCS#12
//! keystores, and certificates in PEM, DER or PKCS#7 envelopes. Every
//! function maps OpenSSL failures onto the crate's error taxonomy so callers
//! can branch on the failure category.

use openssl::pkcs12::Pkcs12;
use openssl::pkcs7::{Pkcs7, Pkcs7Flags};
use openssl::pkey::{PKey, Private};
use openssl::stack::Stack;
use openssl::x509::X509;

use crate::common::error::{TlsError, Result};

const PEM_HEADER: &[u8] = b"-----BEGIN";
const P7B_PEM_HEADER: &[u8] = b"-----BEGIN PKCS7-----";

/// Identity material extracted from a PKCS#12 keystore
#[derive(Debug)]
pub struct KeystoreIdentity {
    pub cert: X509,
    pub key: PKey<Private>,
    pub chain: Vec<X509>,
}

/// Parse a PEM certificate chain
///
/// The first certificate is the leaf, the rest its chain.
pub fn parse_cert_chain_pem(pem: &[u8]) -> Result<Vec<X509>> {
    let certs = X509::stack_from_pem(pem)
        .map_err(|e| TlsError::CertificateParse(e.to_string()))?;

    if certs.is_empty() {
        return Err(TlsError::CertificateParse(
            "no certificates found in PEM input".to_string(),
        ));
    }

    Ok(certs)
}

/// Parse a PEM private key, decrypting it when a password is supplied
pub fn parse_private_key(pem: &[u8], password: Option<&str>) -> Result<PKey<Private>> {
    let parsed = match password {
        Some(password) => PKey::private_key_from_pem_passphrase(pem, password.as_bytes()),
        None => PKey::private_key_from_pem(pem),
    };

    parsed.map_err(|e| TlsError::PrivateKeyParse(e.to_string()))
}

/// Parse a PKCS#12 keystore into identity material
///
/// One password unlocks the archive and its private key entries.
pub fn parse_keystore(der: &[u8], password: &str) -> Result<KeystoreIdentity> {
    let pkcs12 = Pkcs12::from_der(der)
        .map_err(|e| TlsError::KeyStore(format!("malformed PKCS#12 archive: {}", e)))?;

    let parsed = pkcs12
        .parse2(password)
        .map_err(|e| TlsError::KeyStore(format!("failed to unlock keystore: {}", e)))?;

    let cert = parsed
        .cert
        .ok_or_else(|| TlsError::KeyStore("keystore has no certificate entry".to_string()))?;
    let key = parsed
        .pkey
        .ok_or_else(|| TlsError::KeyStore("keystore has no private key entry".to_string()))?;

    let chain = match parsed.ca {
        Some(stack) => stack.into_iter().collect(),
        None => Vec::new(),
    };

    Ok(KeystoreIdentity { cert, key, chain })
}

/// Parse a PKCS#12 archive into the certificates it carries
///
/// Used for trust stores, where a private key entry is not required.
pub fn parse_keystore_certificates(der: &[u8], password: &str) -> Result<Vec<X509>> {
    let pkcs12 = Pkcs12::from_der(der)
        .map_err(|e| TlsError::KeyStore(format!("malformed PKCS#12 archive: {}", e)))?;

    let parsed = pkcs12
        .parse2(password)
        .map_err(|e| TlsError::KeyStore(format!("failed to unlock trust store: {}", e)))?;

    let mut certs = Vec::new();
    if let Some(cert) = parsed.cert {
        certs.push(cert);
    }
    if let Some(stack) = parsed.ca {
        certs.extend(stack.into_iter());
    }

    if certs.is_empty() {
        return Err(TlsError::KeyStore(
            "trust store contains no certificates".to_string(),
        ));
    }

    Ok(certs)
}

/// Parse certificates from PEM, DER or PKCS#7 input, auto-detecting the
/// encoding
pub fn parse_certificates_any(bytes: &[u8]) -> Result<Vec<X509>> {
    if contains(bytes, P7B_PEM_HEADER) {
        let pkcs7 = Pkcs7::from_pem(bytes)
            .map_err(|e| TlsError::CertificateParse(e.to_string()))?;
        return pkcs7_certificates(&pkcs7);
    }

    if contains(bytes, PEM_HEADER) {
        return parse_cert_chain_pem(bytes);
    }

    // Binary input: a bare DER certificate, or a DER encoded PKCS#7 blob.
    if let Ok(cert) = X509::from_der(bytes) {
        return Ok(vec![cert]);
    }

    let pkcs7 = Pkcs7::from_der(bytes)
        .map_err(|e| TlsError::CertificateParse(e.to_string()))?;
    pkcs7_certificates(&pkcs7)
}

/// Parse certificates from a PEM string
pub fn parse_certificates_pem(pem: &str) -> Result<Vec<X509>> {
    parse_cert_chain_pem(pem.as_bytes())
}

/// Parse certificates from a PEM encoded PKCS#7 string
pub fn parse_certificates_p7b(p7b: &str) -> Result<Vec<X509>> {
    let pkcs7 = Pkcs7::from_pem(p7b.as_bytes())
        .map_err(|e| TlsError::CertificateParse(e.to_string()))?;
    pkcs7_certificates(&pkcs7)
}

fn pkcs7_certificates(pkcs7: &Pkcs7) -> Result<Vec<X509>> {
    let excluded = Stack::new().map_err(TlsError::Ssl)?;
    let signers = pkcs7
        .signers(&excluded, Pkcs7Flags::empty())
        .map_err(|e| TlsError::CertificateParse(e.to_string()))?;

    let certs: Vec<X509> = signers.into_iter().collect();
    if certs.is_empty() {
        return Err(TlsError::CertificateParse(
            "no certificates found in PKCS#7 input".to_string(),
        ));
    }

    Ok(certs)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}
