//! Connector assembly
//!
//! Turns a [`ServerTlsConfig`] and a built [`TlsContext`] into
//! listening-endpoint descriptors for the host server: a plain connector,
//! a TLS connector, or both on independent ports. The descriptors carry
//! everything the transport layer needs — bind address, HTTP/2 intent, SNI
//! policy, and the swappable TLS context for the secure endpoint.

use std::sync::Arc;

use log::info;
use tokio::net::TcpListener;

use crate::common::error::{TlsError, Result};
use crate::config::{ServerTlsConfig, DEFAULT_HOST};
use crate::tls::context::TlsContext;

/// Hook invoked with each connector as the last assembly step
pub type ConnectorCustomizer = Arc<dyn Fn(&mut Connector) + Send + Sync>;

/// Connector flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorKind {
    /// Plain transport, optionally speaking cleartext HTTP/2
    Insecure,
    /// TLS transport, optionally negotiating HTTP/2 through ALPN
    Secure,
}

/// A listening-endpoint descriptor
pub struct Connector {
    kind: ConnectorKind,
    host: String,
    port: u16,
    http2: bool,
    sni_host_check: bool,
    context: Option<Arc<TlsContext>>,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("kind", &self.kind)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("http2", &self.http2)
            .field("sni_host_check", &self.sni_host_check)
            .field("context", &self.context.is_some())
            .finish()
    }
}

impl Connector {
    pub fn kind(&self) -> ConnectorKind {
        self.kind
    }

    pub fn is_secure(&self) -> bool {
        self.kind == ConnectorKind::Secure
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Whether the endpoint should speak HTTP/2 (cleartext on the insecure
    /// connector, ALPN-negotiated on the secure one)
    pub fn http2(&self) -> bool {
        self.http2
    }

    /// Whether mismatched SNI names are rejected on this endpoint
    pub fn sni_host_check(&self) -> bool {
        self.sni_host_check
    }

    /// The TLS context terminating connections on this endpoint
    pub fn context(&self) -> Option<&Arc<TlsContext>> {
        self.context.as_ref()
    }

    /// Bind the listening socket
    pub async fn bind(&self) -> Result<TcpListener> {
        let listener = TcpListener::bind((self.host.as_str(), self.port))
            .await
            .map_err(TlsError::Io)?;

        info!(
            "{} connector listening on {}",
            match self.kind {
                ConnectorKind::Insecure => "Insecure",
                ConnectorKind::Secure => "Secure",
            },
            listener.local_addr().map_err(TlsError::Io)?
        );

        Ok(listener)
    }
}

/// Builds the connector set for a patched server
pub struct ConnectorFactory<'a> {
    config: &'a ServerTlsConfig,
    context: Option<Arc<TlsContext>>,
}

impl<'a> ConnectorFactory<'a> {
    pub fn new(config: &'a ServerTlsConfig, context: Option<Arc<TlsContext>>) -> Self {
        Self { config, context }
    }

    /// Create the insecure connector
    pub fn insecure_connector(&self) -> Connector {
        let mut connector = Connector {
            kind: ConnectorKind::Insecure,
            host: self.bind_host(),
            port: self.config.insecure_port,
            http2: self.config.http2,
            sni_host_check: false,
            context: None,
        };

        self.customize(&mut connector);
        connector
    }

    /// Create the secure connector
    ///
    /// Requires the TLS context built from the config's identity material.
    pub fn secure_connector(&self) -> Result<Connector> {
        let context = self.context.clone().ok_or_else(|| {
            TlsError::Config("secure connector requested without a TLS context".to_string())
        })?;

        let mut connector = Connector {
            kind: ConnectorKind::Secure,
            host: self.bind_host(),
            port: self.config.secure_port,
            http2: self.config.http2,
            sni_host_check: self.config.sni_host_check,
            context: Some(context),
        };

        self.customize(&mut connector);
        Ok(connector)
    }

    fn bind_host(&self) -> String {
        self.config
            .host
            .clone()
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
    }

    // Called as the last config step so the hook can override anything.
    fn customize(&self, connector: &mut Connector) {
        if let Some(customizer) = self.config.connector_customizer() {
            customizer(connector);
        }
    }
}
