//! Client trust configuration
//!
//! Configures which client certificates the server accepts. The server will
//! only complete handshakes with clients whose certificate chains back to
//! this material; configuring *any* trust material makes client
//! authentication mandatory. With no trust config present the server accepts
//! any client, certificate or not.
//!
//! Certificates (PEM, DER, PKCS#7) and trust stores (PKCS#12) are parsed
//! eagerly by the loading calls, so malformed material fails at configuration
//! time rather than at context build.

use std::io::Read;
use std::path::Path;

use openssl::x509::X509;

use crate::common::error::Result;
use crate::common::fs::{read_all, read_file};
use crate::common::resource::read_resource;
use crate::tls::material;

/// A loaded trust store: the certificates carried by a PKCS#12 archive
#[derive(Debug, Clone)]
pub struct TrustStore {
    certificates: Vec<X509>,
}

impl TrustStore {
    pub fn certificates(&self) -> &[X509] {
        &self.certificates
    }
}

/// Trust material for verifying client certificates
#[derive(Debug, Default)]
pub struct TrustConfig {
    certificates: Vec<X509>,
    trust_stores: Vec<TrustStore>,
}

impl TrustConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Individually loaded certificates
    pub fn certificates(&self) -> &[X509] {
        &self.certificates
    }

    /// Loaded trust stores
    pub fn trust_stores(&self) -> &[TrustStore] {
        &self.trust_stores
    }

    /// Whether any trust material has been loaded
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty() && self.trust_stores.is_empty()
    }

    ///////////////////////////////////////////////////////////////
    // Certificate loading methods (PEM, P7B and DER)
    ///////////////////////////////////////////////////////////////

    /// Load certificates from a path on disk
    ///
    /// The file may be in PEM, P7B/PKCS#7 or DER format.
    pub fn certificate_from_path(&mut self, certificate_path: impl AsRef<Path>) -> Result<()> {
        let bytes = read_file(certificate_path.as_ref())?;
        self.certificates
            .extend(material::parse_certificates_any(&bytes)?);
        Ok(())
    }

    /// Load certificates from a bundled resource
    ///
    /// The resource may be in PEM, P7B/PKCS#7 or DER format.
    pub fn certificate_from_resource(&mut self, certificate_resource: &str) -> Result<()> {
        let bytes = read_resource(certificate_resource)?;
        self.certificates
            .extend(material::parse_certificates_any(&bytes)?);
        Ok(())
    }

    /// Load certificates from a reader
    ///
    /// The content may be in PEM, P7B/PKCS#7 or DER format.
    pub fn certificate_from_reader(&mut self, mut certificate: impl Read) -> Result<()> {
        let bytes = read_all(&mut certificate)?;
        self.certificates
            .extend(material::parse_certificates_any(&bytes)?);
        Ok(())
    }

    /// Load PEM encoded certificates from a string
    pub fn pem_from_string(&mut self, certificate: &str) -> Result<()> {
        self.certificates
            .extend(material::parse_certificates_pem(certificate)?);
        Ok(())
    }

    /// Load P7B/PKCS#7 encoded certificates from a string
    pub fn p7b_from_string(&mut self, certificate: &str) -> Result<()> {
        self.certificates
            .extend(material::parse_certificates_p7b(certificate)?);
        Ok(())
    }

    ///////////////////////////////////////////////////////////////
    // Trust store loading methods (PKCS#12)
    ///////////////////////////////////////////////////////////////

    /// Load a PKCS#12 trust store from a path on disk
    pub fn trust_store_from_path(
        &mut self,
        trust_store_path: impl AsRef<Path>,
        trust_store_password: &str,
    ) -> Result<()> {
        let bytes = read_file(trust_store_path.as_ref())?;
        let certificates = material::parse_keystore_certificates(&bytes, trust_store_password)?;
        self.trust_stores.push(TrustStore { certificates });
        Ok(())
    }

    /// Load a PKCS#12 trust store from a bundled resource
    pub fn trust_store_from_resource(
        &mut self,
        trust_store_resource: &str,
        trust_store_password: &str,
    ) -> Result<()> {
        let bytes = read_resource(trust_store_resource)?;
        let certificates = material::parse_keystore_certificates(&bytes, trust_store_password)?;
        self.trust_stores.push(TrustStore { certificates });
        Ok(())
    }

    /// Load a PKCS#12 trust store from a reader
    pub fn trust_store_from_reader(
        &mut self,
        mut trust_store: impl Read,
        trust_store_password: &str,
    ) -> Result<()> {
        let bytes = read_all(&mut trust_store)?;
        let certificates = material::parse_keystore_certificates(&bytes, trust_store_password)?;
        self.trust_stores.push(TrustStore { certificates });
        Ok(())
    }
}
