//! Standard security provider
//!
//! Conservative defaults that work on every platform OpenSSL runs on. This
//! provider is the fallback whenever no tuned provider is available.

use openssl::ssl::SslContextBuilder;

use crate::common::error::Result;
use super::{ProviderCapabilities, SecurityProvider};

const STANDARD_GROUPS: &str = "X25519:P-256:P-384:P-521";

/// Standard provider
#[derive(Debug, Default, Clone)]
pub struct StandardProvider;

impl StandardProvider {
    pub fn new() -> Self {
        Self
    }
}

impl SecurityProvider for StandardProvider {
    fn configure(&self, builder: &mut SslContextBuilder) -> Result<()> {
        builder.set_groups_list(STANDARD_GROUPS)?;
        Ok(())
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            accelerated: false,
            supported_key_exchange: vec!["ECDHE".to_string(), "DHE".to_string()],
            recommended_groups: STANDARD_GROUPS.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "standard"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openssl::ssl::{SslContext, SslMethod};

    #[test]
    fn test_configure_succeeds() {
        let mut builder = SslContext::builder(SslMethod::tls_server()).unwrap();
        let provider = StandardProvider::new();
        provider.configure(&mut builder).unwrap();
    }

    #[test]
    fn test_capabilities() {
        let capabilities = StandardProvider::new().capabilities();
        assert!(!capabilities.accelerated);
        assert!(capabilities.recommended_groups.contains("X25519"));
    }
}
