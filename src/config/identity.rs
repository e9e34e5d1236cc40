//! Server identity configuration
//!
//! An identity is the certificate chain plus matching private key the server
//! presents during the TLS handshake. It can be loaded from PEM material
//! (file path, bundled resource, in-memory string, or reader) or from a
//! PKCS#12 keystore (path, resource, or reader). Exactly one loading method
//! may be used per config instance; the second call fails with
//! [`TlsError::MultipleIdentitySources`] no matter which method it is.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use crate::common::error::{TlsError, Result};

/// The selected identity-loading strategy
///
/// One variant per strategy, each carrying exactly the fields that strategy
/// needs. Reader variants own their streams and are drained on resolution.
pub enum IdentitySource {
    /// No identity has been configured
    None,
    /// PEM certificate chain and private key files on disk
    PemPath {
        cert: PathBuf,
        key: PathBuf,
        password: Option<String>,
    },
    /// PEM certificate chain and private key as named bundled resources
    PemResource {
        cert: String,
        key: String,
        password: Option<String>,
    },
    /// PEM certificate chain and private key held in memory
    PemString {
        cert: String,
        key: String,
        password: Option<String>,
    },
    /// PEM certificate chain and private key drained from readers
    PemReader {
        cert: Box<dyn Read + Send + Sync>,
        key: Box<dyn Read + Send + Sync>,
        password: Option<String>,
    },
    /// PKCS#12 keystore file on disk
    KeystorePath { path: PathBuf, password: String },
    /// PKCS#12 keystore as a named bundled resource
    KeystoreResource { name: String, password: String },
    /// PKCS#12 keystore drained from a reader
    KeystoreReader {
        reader: Box<dyn Read + Send + Sync>,
        password: String,
    },
}

impl IdentitySource {
    /// Short name of the strategy, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            IdentitySource::None => "none",
            IdentitySource::PemPath { .. } => "pem-path",
            IdentitySource::PemResource { .. } => "pem-resource",
            IdentitySource::PemString { .. } => "pem-string",
            IdentitySource::PemReader { .. } => "pem-reader",
            IdentitySource::KeystorePath { .. } => "keystore-path",
            IdentitySource::KeystoreResource { .. } => "keystore-resource",
            IdentitySource::KeystoreReader { .. } => "keystore-reader",
        }
    }
}

impl Default for IdentitySource {
    fn default() -> Self {
        IdentitySource::None
    }
}

impl fmt::Debug for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Readers are not Debug and passwords must not leak into logs.
        f.debug_struct("IdentitySource")
            .field("kind", &self.kind())
            .finish()
    }
}

/// How to obtain the server's certificate and private key
///
/// Single-assignment: once any loading method has been called, every further
/// loading call on the same instance fails.
#[derive(Debug, Default)]
pub struct IdentityConfig {
    source: IdentitySource,
}

impl IdentityConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an identity source has been selected
    pub fn is_configured(&self) -> bool {
        !matches!(self.source, IdentitySource::None)
    }

    /// The configured source
    pub fn source(&self) -> &IdentitySource {
        &self.source
    }

    /// Consume the configured source, leaving the config empty
    ///
    /// Used by the resolver; reader-based sources can only be resolved once.
    pub(crate) fn take_source(&mut self) -> IdentitySource {
        std::mem::take(&mut self.source)
    }

    fn install(&mut self, source: IdentitySource) -> Result<()> {
        if self.is_configured() {
            return Err(TlsError::MultipleIdentitySources);
        }
        self.source = source;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////
    // PEM loading methods
    ///////////////////////////////////////////////////////////////

    /// Load PEM formatted identity material from paths on disk
    pub fn pem_from_path(
        &mut self,
        certificate_path: impl Into<PathBuf>,
        private_key_path: impl Into<PathBuf>,
    ) -> Result<()> {
        self.install(IdentitySource::PemPath {
            cert: certificate_path.into(),
            key: private_key_path.into(),
            password: None,
        })
    }

    /// Load PEM formatted identity material from paths on disk, decrypting
    /// the private key with the given password
    pub fn pem_from_path_with_password(
        &mut self,
        certificate_path: impl Into<PathBuf>,
        private_key_path: impl Into<PathBuf>,
        private_key_password: impl Into<String>,
    ) -> Result<()> {
        self.install(IdentitySource::PemPath {
            cert: certificate_path.into(),
            key: private_key_path.into(),
            password: Some(private_key_password.into()),
        })
    }

    /// Load PEM formatted identity material from bundled resources
    pub fn pem_from_resource(
        &mut self,
        certificate_resource: impl Into<String>,
        private_key_resource: impl Into<String>,
    ) -> Result<()> {
        self.install(IdentitySource::PemResource {
            cert: certificate_resource.into(),
            key: private_key_resource.into(),
            password: None,
        })
    }

    /// Load PEM formatted identity material from bundled resources,
    /// decrypting the private key with the given password
    pub fn pem_from_resource_with_password(
        &mut self,
        certificate_resource: impl Into<String>,
        private_key_resource: impl Into<String>,
        private_key_password: impl Into<String>,
    ) -> Result<()> {
        self.install(IdentitySource::PemResource {
            cert: certificate_resource.into(),
            key: private_key_resource.into(),
            password: Some(private_key_password.into()),
        })
    }

    /// Load PEM formatted identity material from in-memory strings
    pub fn pem_from_string(
        &mut self,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Result<()> {
        self.install(IdentitySource::PemString {
            cert: certificate.into(),
            key: private_key.into(),
            password: None,
        })
    }

    /// Load PEM formatted identity material from in-memory strings,
    /// decrypting the private key with the given password
    pub fn pem_from_string_with_password(
        &mut self,
        certificate: impl Into<String>,
        private_key: impl Into<String>,
        private_key_password: impl Into<String>,
    ) -> Result<()> {
        self.install(IdentitySource::PemString {
            cert: certificate.into(),
            key: private_key.into(),
            password: Some(private_key_password.into()),
        })
    }

    /// Load PEM formatted identity material from readers
    pub fn pem_from_reader(
        &mut self,
        certificate: impl Read + Send + Sync + 'static,
        private_key: impl Read + Send + Sync + 'static,
    ) -> Result<()> {
        self.install(IdentitySource::PemReader {
            cert: Box::new(certificate),
            key: Box::new(private_key),
            password: None,
        })
    }

    /// Load PEM formatted identity material from readers, decrypting the
    /// private key with the given password
    pub fn pem_from_reader_with_password(
        &mut self,
        certificate: impl Read + Send + Sync + 'static,
        private_key: impl Read + Send + Sync + 'static,
        private_key_password: impl Into<String>,
    ) -> Result<()> {
        self.install(IdentitySource::PemReader {
            cert: Box::new(certificate),
            key: Box::new(private_key),
            password: Some(private_key_password.into()),
        })
    }

    ///////////////////////////////////////////////////////////////
    // Keystore loading methods
    ///////////////////////////////////////////////////////////////

    /// Load a PKCS#12 keystore from a path on disk
    ///
    /// One password unlocks both the keystore and the private key entries it
    /// contains.
    pub fn keystore_from_path(
        &mut self,
        keystore_path: impl Into<PathBuf>,
        keystore_password: impl Into<String>,
    ) -> Result<()> {
        self.install(IdentitySource::KeystorePath {
            path: keystore_path.into(),
            password: keystore_password.into(),
        })
    }

    /// Load a PKCS#12 keystore from a bundled resource
    pub fn keystore_from_resource(
        &mut self,
        keystore_resource: impl Into<String>,
        keystore_password: impl Into<String>,
    ) -> Result<()> {
        self.install(IdentitySource::KeystoreResource {
            name: keystore_resource.into(),
            password: keystore_password.into(),
        })
    }

    /// Load a PKCS#12 keystore from a reader
    pub fn keystore_from_reader(
        &mut self,
        keystore: impl Read + Send + Sync + 'static,
        keystore_password: impl Into<String>,
    ) -> Result<()> {
        self.install(IdentitySource::KeystoreReader {
            reader: Box::new(keystore),
            password: keystore_password.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_default_is_unconfigured() {
        let config = IdentityConfig::new();
        assert!(!config.is_configured());
        assert_eq!(config.source().kind(), "none");
    }

    #[test]
    fn test_single_assignment() {
        let mut config = IdentityConfig::new();
        config.pem_from_path("cert.pem", "key.pem").unwrap();
        assert!(config.is_configured());

        // Any second loading call fails, including the same method again.
        let err = config.pem_from_path("cert.pem", "key.pem").unwrap_err();
        assert!(matches!(err, TlsError::MultipleIdentitySources));

        let err = config
            .keystore_from_path("store.p12", "secret")
            .unwrap_err();
        assert!(matches!(err, TlsError::MultipleIdentitySources));
    }

    #[test]
    fn test_every_method_blocks_every_other() {
        let loaders: Vec<fn(&mut IdentityConfig) -> Result<()>> = vec![
            |c| c.pem_from_path("c", "k"),
            |c| c.pem_from_resource("c", "k"),
            |c| c.pem_from_string("c", "k"),
            |c| c.pem_from_reader(Cursor::new(vec![]), Cursor::new(vec![])),
            |c| c.keystore_from_path("s", "p"),
            |c| c.keystore_from_resource("s", "p"),
            |c| c.keystore_from_reader(Cursor::new(vec![]), "p"),
        ];

        for first in &loaders {
            for second in &loaders {
                let mut config = IdentityConfig::new();
                first(&mut config).unwrap();
                let err = second(&mut config).unwrap_err();
                assert!(matches!(err, TlsError::MultipleIdentitySources));
            }
        }
    }

    #[test]
    fn test_take_source_resets() {
        let mut config = IdentityConfig::new();
        config
            .pem_from_string_with_password("cert", "key", "hunter2")
            .unwrap();

        let source = config.take_source();
        assert_eq!(source.kind(), "pem-string");
        assert!(!config.is_configured());
    }

    #[test]
    fn test_debug_does_not_leak_material() {
        let mut config = IdentityConfig::new();
        config
            .pem_from_string_with_password("cert", "key", "hunter2")
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
    }
}
