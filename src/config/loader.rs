//! Settings loader
//!
//! Seeds a [`ServerTlsConfig`] from a JSON file or from prefixed
//! environment variables. Only the declarative knobs are covered here:
//! host, ports, connector toggles, the profile by name, and on-disk
//! identity/trust material. Anything richer (strings, readers, custom
//! providers, connector hooks) is configured programmatically.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::common::error::{TlsError, Result};
use crate::config::ServerTlsConfig;
use crate::tls::profile::TlsProfile;

/// Environment variable prefix for all settings
pub const ENV_PREFIX: &str = "TLS_HOTSWAP_";

/// Declarative plugin settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(default)]
pub struct TlsSettings {
    /// Host to bind to
    pub host: Option<String>,

    /// Toggle the insecure connector
    pub insecure: bool,

    /// Toggle the secure connector
    pub secure: bool,

    /// Port for the insecure connector
    pub insecure_port: u16,

    /// Port for the secure connector
    pub secure_port: u16,

    /// Toggle HTTP/2 support
    pub http2: bool,

    /// Toggle SNI hostname validation
    pub sni_host_check: bool,

    /// TLS profile name: modern, intermediate or old
    pub profile: String,

    /// Path to the PEM certificate chain
    pub pem_certificate: Option<PathBuf>,

    /// Path to the PEM private key
    pub pem_private_key: Option<PathBuf>,

    /// Password for an encrypted private key
    pub private_key_password: Option<String>,

    /// Path to a PKCS#12 keystore
    pub keystore: Option<PathBuf>,

    /// Password for the keystore
    pub keystore_password: Option<String>,

    /// Path to a certificate whose holders are trusted as clients
    pub trust_certificate: Option<PathBuf>,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            host: None,
            insecure: true,
            secure: true,
            insecure_port: super::DEFAULT_INSECURE_PORT,
            secure_port: super::DEFAULT_SECURE_PORT,
            http2: true,
            sni_host_check: true,
            profile: "intermediate".to_string(),
            pem_certificate: None,
            pem_private_key: None,
            private_key_password: None,
            keystore: None,
            keystore_password: None,
            trust_certificate: None,
        }
    }
}

impl TlsSettings {
    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading TLS settings from {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| {
            TlsError::Config(format!("failed to read settings file {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            TlsError::Config(format!("failed to parse settings file {}: {}", path.display(), e))
        })
    }

    /// Load settings from `TLS_HOTSWAP_*` environment variables
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let get_env = |name: &str| -> Option<String> {
            env::var(format!("{}{}", ENV_PREFIX, name)).ok()
        };

        let mut settings = Self::default();

        if let Some(host) = get_env("HOST") {
            settings.host = Some(host);
        }
        if let Some(insecure) = get_env("INSECURE") {
            settings.insecure = parse_bool("INSECURE", &insecure)?;
        }
        if let Some(secure) = get_env("SECURE") {
            settings.secure = parse_bool("SECURE", &secure)?;
        }
        if let Some(port) = get_env("INSECURE_PORT") {
            settings.insecure_port = parse_port("INSECURE_PORT", &port)?;
        }
        if let Some(port) = get_env("SECURE_PORT") {
            settings.secure_port = parse_port("SECURE_PORT", &port)?;
        }
        if let Some(http2) = get_env("HTTP2") {
            settings.http2 = parse_bool("HTTP2", &http2)?;
        }
        if let Some(check) = get_env("SNI_HOST_CHECK") {
            settings.sni_host_check = parse_bool("SNI_HOST_CHECK", &check)?;
        }
        if let Some(profile) = get_env("PROFILE") {
            settings.profile = profile;
        }
        if let Some(cert) = get_env("PEM_CERTIFICATE") {
            settings.pem_certificate = Some(cert.into());
        }
        if let Some(key) = get_env("PEM_PRIVATE_KEY") {
            settings.pem_private_key = Some(key.into());
        }
        if let Some(password) = get_env("PRIVATE_KEY_PASSWORD") {
            settings.private_key_password = Some(password);
        }
        if let Some(keystore) = get_env("KEYSTORE") {
            settings.keystore = Some(keystore.into());
        }
        if let Some(password) = get_env("KEYSTORE_PASSWORD") {
            settings.keystore_password = Some(password);
        }
        if let Some(trust) = get_env("TRUST_CERTIFICATE") {
            settings.trust_certificate = Some(trust.into());
        }

        Ok(settings)
    }

    /// Turn the settings into a server configuration
    pub fn into_config(self) -> Result<ServerTlsConfig> {
        let mut config = ServerTlsConfig::new();
        config.host = self.host;
        config.insecure = self.insecure;
        config.secure = self.secure;
        config.insecure_port = self.insecure_port;
        config.secure_port = self.secure_port;
        config.http2 = self.http2;
        config.sni_host_check = self.sni_host_check;
        config.profile = TlsProfile::from_name(&self.profile)?.clone();

        match (self.pem_certificate, self.pem_private_key) {
            (Some(cert), Some(key)) => match self.private_key_password {
                Some(password) => config.identity.pem_from_path_with_password(cert, key, password)?,
                None => config.identity.pem_from_path(cert, key)?,
            },
            (None, None) => {}
            _ => {
                return Err(TlsError::Config(
                    "pem_certificate and pem_private_key must be set together".to_string(),
                ))
            }
        }

        if let Some(keystore) = self.keystore {
            let password = self.keystore_password.ok_or_else(|| {
                TlsError::Config("keystore_password is required with keystore".to_string())
            })?;
            config.identity.keystore_from_path(keystore, password)?;
        }

        if let Some(trust_certificate) = self.trust_certificate {
            config.with_trust(|trust| trust.certificate_from_path(&trust_certificate))?;
        }

        Ok(config)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(TlsError::Config(format!(
            "invalid boolean for {}{}: {}",
            ENV_PREFIX, name, value
        ))),
    }
}

fn parse_port(name: &str, value: &str) -> Result<u16> {
    value.parse().map_err(|_| {
        TlsError::Config(format!("invalid port for {}{}: {}", ENV_PREFIX, name, value))
    })
}
