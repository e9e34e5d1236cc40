//! Configuration module
//!
//! Holds the plugin's configuration surface: the server-wide knobs
//! ([`ServerTlsConfig`]), the identity and trust sub-configurations, the
//! reload material ([`ReloadConfig`]), and a loader that seeds the knobs
//! from a JSON file or environment variables.

pub mod identity;
pub mod loader;
pub mod trust;

// Re-export types and traits
pub use identity::{IdentityConfig, IdentitySource};
pub use loader::{TlsSettings, ENV_PREFIX};
pub use trust::{TrustConfig, TrustStore};

use std::fmt;

use crate::common::error::{TlsError, Result};
use crate::connector::ConnectorCustomizer;
use crate::crypto::provider::ProviderSelection;
use crate::tls::profile::TlsProfile;

/// Default bind host when none is configured
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for the secure connector
pub const DEFAULT_SECURE_PORT: u16 = 443;

/// Default port for the insecure connector
pub const DEFAULT_INSECURE_PORT: u16 = 80;

/// Configuration for the plugin
///
/// Mutated through its fields and helper methods before the server is
/// patched; treated as read-only once the TLS context has been built.
pub struct ServerTlsConfig {
    /// Host to bind to; `None` binds every interface
    pub host: Option<String>,

    /// Toggle the default http (insecure) connector
    pub insecure: bool,

    /// Toggle the default https (secure) connector
    pub secure: bool,

    /// Port to use on the secure connector
    pub secure_port: u16,

    /// Port to use on the insecure connector
    pub insecure_port: u16,

    /// Toggle HTTP/2 support
    pub http2: bool,

    /// Whether handshakes with an SNI name not matching the certificate
    /// are rejected
    pub sni_host_check: bool,

    /// Enables HTTP/3 support. Not implemented; patching fails when set.
    pub enable_http3: bool,

    /// TLS security configuration
    pub profile: TlsProfile,

    /// Security provider to use for the TLS context
    pub provider: ProviderSelection,

    /// Identity material for the secure connector
    pub identity: IdentityConfig,

    trust: Option<TrustConfig>,

    connector_customizer: Option<ConnectorCustomizer>,
}

impl Default for ServerTlsConfig {
    fn default() -> Self {
        Self {
            host: None,
            insecure: true,
            secure: true,
            secure_port: DEFAULT_SECURE_PORT,
            insecure_port: DEFAULT_INSECURE_PORT,
            http2: true,
            sni_host_check: true,
            enable_http3: false,
            profile: TlsProfile::default(),
            provider: ProviderSelection::default(),
            identity: IdentityConfig::new(),
            trust: None,
            connector_customizer: None,
        }
    }
}

impl ServerTlsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure trust material for client certificate verification
    ///
    /// Creating a trust configuration makes client authentication
    /// mandatory: once any material is loaded here, the server rejects
    /// clients that do not present a certificate chaining to it.
    pub fn with_trust(&mut self, f: impl FnOnce(&mut TrustConfig) -> Result<()>) -> Result<()> {
        let mut trust = TrustConfig::new();
        f(&mut trust)?;
        self.trust = Some(trust);
        Ok(())
    }

    /// The configured trust material, if any
    pub fn trust(&self) -> Option<&TrustConfig> {
        self.trust.as_ref()
    }

    /// Install a hook invoked with each connector as the last assembly
    /// step, allowing it to override any previous configuration
    pub fn config_connector(
        &mut self,
        f: impl Fn(&mut crate::connector::Connector) + Send + Sync + 'static,
    ) {
        self.connector_customizer = Some(std::sync::Arc::new(f));
    }

    pub(crate) fn connector_customizer(&self) -> Option<&ConnectorCustomizer> {
        self.connector_customizer.as_ref()
    }

    /// Check the connector knobs for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(host) = &self.host {
            if host.is_empty() {
                return Err(TlsError::Config("invalid host provided".to_string()));
            }
        }

        if !self.insecure && !self.secure {
            return Err(TlsError::Config(
                "at least one connector must be enabled".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for ServerTlsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerTlsConfig")
            .field("host", &self.host)
            .field("insecure", &self.insecure)
            .field("secure", &self.secure)
            .field("secure_port", &self.secure_port)
            .field("insecure_port", &self.insecure_port)
            .field("http2", &self.http2)
            .field("sni_host_check", &self.sni_host_check)
            .field("identity", &self.identity)
            .field("trust_configured", &self.trust.is_some())
            .finish()
    }
}

/// Fresh material for a hot reload
///
/// Only identity and trust material can change at reload time; every other
/// knob of the running server keeps its original value.
#[derive(Debug, Default)]
pub struct ReloadConfig {
    /// Replacement identity material
    pub identity: IdentityConfig,

    trust: Option<TrustConfig>,
}

impl ReloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure replacement trust material
    pub fn with_trust(&mut self, f: impl FnOnce(&mut TrustConfig) -> Result<()>) -> Result<()> {
        let mut trust = TrustConfig::new();
        f(&mut trust)?;
        self.trust = Some(trust);
        Ok(())
    }

    /// The replacement trust material, if any
    pub fn trust(&self) -> Option<&TrustConfig> {
        self.trust.as_ref()
    }
}
