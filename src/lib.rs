//! tls-hotswap: TLS termination for embedded servers, with certificate
//! hot-reload and security-profile enforcement.
//!
//! This library is structured as a plugin: it patches a host server's
//! connector set rather than running a server of its own. It resolves
//! identity material (PEM or PKCS#12, from paths, bundled resources,
//! strings or readers), optional mTLS trust material, and a TLS security
//! profile into a hot-swappable server context, then hands the host a set
//! of listening-endpoint descriptors.
//!
//! # Main Features
//!
//! - Identity material from heterogeneous sources, enforced as exactly one
//!   loading strategy per configuration
//! - Mozilla-guideline security profiles (MODERN / INTERMEDIATE / OLD) and
//!   custom cipher/protocol pairs
//! - Mutual TLS with unioned certificate and trust-store anchors
//! - Atomic certificate hot-reload under live traffic, without restarting
//!   listeners or dropping in-flight connections
//!
//! # Example
//!
//! ```no_run
//! use tls_hotswap::{TlsPlugin, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut plugin = TlsPlugin::with(|config| {
//!         config.secure_port = 8443;
//!         config.insecure = false;
//!         config.identity.pem_from_path("certs/server.crt", "certs/server.key")
//!     })?;
//!
//!     // Hand the connectors to the host server.
//!     let connectors = plugin.patch()?;
//!     for connector in &connectors {
//!         let listener = connector.bind().await?;
//!         let context = connector.context().cloned();
//!         tokio::spawn(async move {
//!             loop {
//!                 let Ok((stream, _peer)) = listener.accept().await else { continue };
//!                 if let Some(context) = &context {
//!                     if let Ok(_tls_stream) = context.accept(stream).await {
//!                         // hand the stream to the HTTP layer
//!                     }
//!                 }
//!             }
//!         });
//!     }
//!
//!     // Later, swap the certificate without restarting:
//!     plugin.reload(|material| {
//!         material.identity.pem_from_path("certs/renewed.crt", "certs/renewed.key")
//!     })?;
//!
//!     Ok(())
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod connector;
pub mod crypto;
pub mod plugin;
pub mod tls;

// Re-export commonly used structures and functions for convenience
pub use common::{init_logger, Result, TlsError};
pub use config::{IdentityConfig, ReloadConfig, ServerTlsConfig, TlsSettings, TrustConfig};
pub use connector::{Connector, ConnectorFactory, ConnectorKind};
pub use crypto::provider::{ProviderSelection, SecurityProvider};
pub use plugin::TlsPlugin;
pub use tls::{TlsContext, TlsProfile, TlsVersion};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
