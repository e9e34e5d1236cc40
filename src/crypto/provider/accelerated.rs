//! Platform-tuned security provider
//!
//! Applies tuning appropriate for 64-bit platforms with hardware AES:
//! server-side cipher ordering, with ChaCha20 bumped up for clients that
//! signal no AES acceleration of their own.

use openssl::ssl::{SslContextBuilder, SslOptions};

use crate::common::error::Result;
use super::{ProviderCapabilities, SecurityProvider};

const ACCELERATED_GROUPS: &str = "X25519:P-256:P-384";

/// Tuned provider for 64-bit Linux, macOS and Windows
#[derive(Debug, Default, Clone)]
pub struct AcceleratedProvider;

impl AcceleratedProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SecurityProvider for AcceleratedProvider {
    fn configure(&self, builder: &mut SslContextBuilder) -> Result<()> {
        builder.set_groups_list(ACCELERATED_GROUPS)?;
        builder.set_options(SslOptions::CIPHER_SERVER_PREFERENCE | SslOptions::PRIORITIZE_CHACHA);
        Ok(())
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            accelerated: true,
            supported_key_exchange: vec!["ECDHE".to_string(), "DHE".to_string()],
            recommended_groups: ACCELERATED_GROUPS.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "accelerated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::ssl::{SslContext, SslMethod};

    #[test]
    fn test_configure_succeeds() {
        let mut builder = SslContext::builder(SslMethod::tls_server()).unwrap();
        let provider = AcceleratedProvider::new();
        provider.configure(&mut builder).unwrap();
    }

    #[test]
    fn test_capabilities() {
        let capabilities = AcceleratedProvider::new().capabilities();
        assert!(capabilities.accelerated);
    }
}
