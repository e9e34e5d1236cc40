//! Error handling module
//!
//! This module defines the error types and result type alias used throughout
//! the crate. Every failure category a caller may want to branch on has its
//! own variant; none of them are collapsed into strings.

use thiserror::Error;
use std::io;

/// TLS plugin error type
#[derive(Error, Debug)]
pub enum TlsError {
    /// No identity source was configured when one was required
    #[error("no certificate or private key was provided")]
    MissingIdentity,

    /// A second identity-loading method was called on the same config
    #[error("the certificate and key must be provided using exactly one loading method")]
    MultipleIdentitySources,

    /// Malformed certificate content, from any source
    #[error("certificate parse error: {0}")]
    CertificateParse(String),

    /// Malformed private key content, or a wrong decryption password
    #[error("private key parse error: {0}")]
    PrivateKeyParse(String),

    /// Malformed keystore, unreadable path, or wrong keystore password
    #[error("keystore error: {0}")]
    KeyStore(String),

    /// A bundled-resource name did not resolve to an existing entry
    #[error("resource not found: {0}")]
    InvalidResourceLocation(String),

    /// Reload was invoked with no active TLS context
    #[error("cannot reload before a server has been patched or while the secure connector is disabled")]
    ReloadBeforeActivation,

    /// A requested capability is not implemented
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// Configuration error (invalid host, port, connector combination)
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// OpenSSL error during context assembly
    #[error("OpenSSL error: {0}")]
    Ssl(#[from] openssl::error::ErrorStack),

    /// TLS handshake error on an accepted connection
    #[error("TLS handshake error: {0}")]
    TlsHandshake(String),
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `TlsError`.
pub type Result<T> = std::result::Result<T, TlsError>;
