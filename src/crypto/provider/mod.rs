//! Security provider module
//!
//! A provider contributes backend-specific tuning to a TLS context: curve
//! group preferences and cipher-ordering options. The factory picks the
//! best provider for the current platform unless the caller supplies an
//! explicit one.

mod factory;
mod standard;
mod accelerated;

pub use factory::{platform_supports_acceleration, select_provider};
pub use standard::StandardProvider;
pub use accelerated::AcceleratedProvider;

use std::sync::Arc;

use openssl::ssl::SslContextBuilder;

use crate::common::error::Result;

/// Provider capabilities
#[derive(Debug, Clone)]
pub struct ProviderCapabilities {
    /// Whether the provider assumes hardware-accelerated AES
    pub accelerated: bool,

    /// Supported key exchange algorithms
    pub supported_key_exchange: Vec<String>,

    /// Recommended curve group list, most preferred first
    pub recommended_groups: String,
}

/// Security provider trait
///
/// Implementations tune a server context for a cryptographic backend. The
/// built-in providers never fail; a custom provider may.
pub trait SecurityProvider: Send + Sync + std::fmt::Debug {
    /// Apply the provider's tuning to a context under construction
    fn configure(&self, builder: &mut SslContextBuilder) -> Result<()>;

    /// Get the provider's capabilities
    fn capabilities(&self) -> ProviderCapabilities;

    /// Get the provider's name
    fn name(&self) -> &'static str;
}

/// Which provider to use for a TLS context
#[derive(Debug, Clone, Default)]
pub enum ProviderSelection {
    /// Pick the best provider for the current OS and architecture,
    /// falling back to the standard provider when unsupported
    #[default]
    Auto,

    /// Always use the standard provider
    Standard,

    /// Use the platform-tuned provider; falls back softly when the
    /// platform does not support it
    Accelerated,

    /// Use the given provider as-is
    Custom(Arc<dyn SecurityProvider>),
}
