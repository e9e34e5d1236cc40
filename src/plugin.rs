//! TLS plugin
//!
//! Ties the subsystems together: resolves the configured identity and
//! trust material, builds the swappable TLS context, assembles connectors
//! for the host server, and coordinates hot reloads.

use std::sync::Arc;

use log::info;

use crate::common::error::{TlsError, Result};
use crate::config::{ReloadConfig, ServerTlsConfig, TrustConfig};
use crate::connector::{Connector, ConnectorFactory};
use crate::crypto::provider::select_provider;
use crate::tls::context::{ContextPolicy, TlsContext};
use crate::tls::trust::ResolvedTrust;
use crate::tls::{identity, trust};

/// A plugin that equips an embedded server with TLS termination
///
/// The intended pattern is to configure through [`TlsPlugin::with`], patch
/// the host server with the returned connectors, and keep the plugin
/// around for [`TlsPlugin::reload`] calls.
pub struct TlsPlugin {
    config: ServerTlsConfig,
    context: Option<Arc<TlsContext>>,
}

impl std::fmt::Debug for TlsPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsPlugin")
            .field("config", &self.config)
            .field("context", &self.context.is_some())
            .finish()
    }
}

impl TlsPlugin {
    /// Create a plugin from an existing configuration
    pub fn new(config: ServerTlsConfig) -> Self {
        Self {
            config,
            context: None,
        }
    }

    /// Create a plugin, configuring it through a closure
    pub fn with(f: impl FnOnce(&mut ServerTlsConfig) -> Result<()>) -> Result<Self> {
        let mut config = ServerTlsConfig::new();
        f(&mut config)?;
        Ok(Self::new(config))
    }

    /// The plugin's configuration
    pub fn config(&self) -> &ServerTlsConfig {
        &self.config
    }

    /// The live TLS context, once the plugin has been applied
    pub fn context(&self) -> Option<&Arc<TlsContext>> {
        self.context.as_ref()
    }

    /// Patch a server: build the TLS context and assemble its connectors
    ///
    /// Builds the context only when the secure connector is enabled, and
    /// only on the first call; repeated patching reuses the live context.
    /// A malformed or missing identity fails here, before the server
    /// starts.
    pub fn patch(&mut self) -> Result<Vec<Connector>> {
        self.config.validate()?;

        if self.config.enable_http3 {
            return Err(TlsError::UnsupportedFeature("HTTP/3".to_string()));
        }

        if self.config.secure && self.context.is_none() {
            let context = self.build_context()?;
            self.context = Some(Arc::new(context));
        }

        let factory = ConnectorFactory::new(&self.config, self.context.clone());

        let mut connectors = Vec::new();
        if self.config.insecure {
            connectors.push(factory.insecure_connector());
        }
        if self.config.secure {
            connectors.push(factory.secure_connector()?);
        }

        info!("Assembled {} connector(s)", connectors.len());
        Ok(connectors)
    }

    /// Hot-swap the certificate and key material of the plugin
    ///
    /// The closure configures the replacement material. Any configuration
    /// other than identity and trust material is ignored: cipher, protocol
    /// and connector policy keep the values they had at patch time. Fails
    /// with [`TlsError::ReloadBeforeActivation`] before the plugin has been
    /// applied, or when the secure connector is disabled. A failed reload
    /// leaves the running material untouched.
    pub fn reload(&self, f: impl FnOnce(&mut ReloadConfig) -> Result<()>) -> Result<()> {
        let context = self
            .context
            .as_ref()
            .ok_or(TlsError::ReloadBeforeActivation)?;

        let mut material = ReloadConfig::new();
        f(&mut material)?;

        // Identity resolves first, then trust, then the swap; a failure at
        // any step aborts before the live context is touched.
        let identity = identity::resolve(&mut material.identity)?;
        let trust = resolve_trust(material.trust())?;

        context.swap_material(identity, trust)
    }

    fn build_context(&mut self) -> Result<TlsContext> {
        let identity = identity::resolve(&mut self.config.identity)?;
        let trust = resolve_trust(self.config.trust())?;

        let policy = ContextPolicy {
            profile: self.config.profile.clone(),
            alpn_h2: self.config.http2,
            sni_host_check: self.config.sni_host_check,
            provider: select_provider(&self.config.provider),
        };

        TlsContext::build(identity, trust, policy)
    }
}

// An absent or empty trust config means "verify nothing": the resolver is
// skipped entirely.
fn resolve_trust(config: Option<&TrustConfig>) -> Result<Option<ResolvedTrust>> {
    match config {
        Some(trust_config) if !trust_config.is_empty() => {
            Ok(Some(trust::resolve(trust_config)?))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_before_patch_is_rejected() {
        let plugin = TlsPlugin::new(ServerTlsConfig::new());
        let err = plugin
            .reload(|material| material.identity.pem_from_string("cert", "key"))
            .unwrap_err();
        assert!(matches!(err, TlsError::ReloadBeforeActivation));
    }

    #[test]
    fn test_patch_without_identity_is_missing_identity() {
        let mut plugin = TlsPlugin::new(ServerTlsConfig::new());
        let err = plugin.patch().unwrap_err();
        assert!(matches!(err, TlsError::MissingIdentity));
    }

    #[test]
    fn test_http3_is_unsupported() {
        let mut plugin = TlsPlugin::with(|config| {
            config.enable_http3 = true;
            Ok(())
        })
        .unwrap();

        let err = plugin.patch().unwrap_err();
        assert!(matches!(err, TlsError::UnsupportedFeature(_)));
    }

    #[test]
    fn test_insecure_only_patch_builds_no_context() {
        let mut plugin = TlsPlugin::with(|config| {
            config.secure = false;
            Ok(())
        })
        .unwrap();

        let connectors = plugin.patch().unwrap();
        assert_eq!(connectors.len(), 1);
        assert!(plugin.context().is_none());

        // ...and reloading such a server is a caller error.
        let err = plugin
            .reload(|material| material.identity.pem_from_string("cert", "key"))
            .unwrap_err();
        assert!(matches!(err, TlsError::ReloadBeforeActivation));
    }
}
