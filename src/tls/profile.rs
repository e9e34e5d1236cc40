//! TLS security profiles
//!
//! Three fixed presets pairing a cipher-suite allow-list with a protocol
//! allow-list, following the Mozilla server side TLS guidelines (version
//! 5.7). OpenSSL configures the pre-TLS1.3 cipher list and the TLS1.3 suite
//! list separately, so the profile carries both; their union is the
//! profile's full cipher-suite set.
//!
//! The presets are process-wide constants, built once and never mutated.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use openssl::ssl::{SslOptions, SslVersion};

use crate::common::error::{TlsError, Result};

/// A TLS protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TlsVersion {
    Tls1,
    Tls1_1,
    Tls1_2,
    Tls1_3,
}

impl TlsVersion {
    /// All versions, oldest first
    pub const ALL: [TlsVersion; 4] = [
        TlsVersion::Tls1,
        TlsVersion::Tls1_1,
        TlsVersion::Tls1_2,
        TlsVersion::Tls1_3,
    ];

    /// The matching OpenSSL version constant
    pub fn openssl_version(self) -> SslVersion {
        match self {
            TlsVersion::Tls1 => SslVersion::TLS1,
            TlsVersion::Tls1_1 => SslVersion::TLS1_1,
            TlsVersion::Tls1_2 => SslVersion::TLS1_2,
            TlsVersion::Tls1_3 => SslVersion::TLS1_3,
        }
    }

    /// The OpenSSL option that disables this version
    pub fn disable_option(self) -> SslOptions {
        match self {
            TlsVersion::Tls1 => SslOptions::NO_TLSV1,
            TlsVersion::Tls1_1 => SslOptions::NO_TLSV1_1,
            TlsVersion::Tls1_2 => SslOptions::NO_TLSV1_2,
            TlsVersion::Tls1_3 => SslOptions::NO_TLSV1_3,
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TlsVersion::Tls1 => write!(f, "TLSv1"),
            TlsVersion::Tls1_1 => write!(f, "TLSv1.1"),
            TlsVersion::Tls1_2 => write!(f, "TLSv1.2"),
            TlsVersion::Tls1_3 => write!(f, "TLSv1.3"),
        }
    }
}

impl FromStr for TlsVersion {
    type Err = TlsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TLSv1" => Ok(TlsVersion::Tls1),
            "TLSv1.1" => Ok(TlsVersion::Tls1_1),
            "TLSv1.2" => Ok(TlsVersion::Tls1_2),
            "TLSv1.3" => Ok(TlsVersion::Tls1_3),
            _ => Err(TlsError::Config(format!(
                "invalid TLS protocol version: {}. Valid values are: TLSv1, TLSv1.1, TLSv1.2, TLSv1.3",
                s
            ))),
        }
    }
}

/// A cipher-suite and protocol allow-list pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsProfile {
    cipher_list: Vec<String>,
    tls13_cipher_suites: Vec<String>,
    protocols: Vec<TlsVersion>,
}

/// For modern clients that support TLS 1.3, with no need for backwards
/// compatibility
pub static MODERN: Lazy<TlsProfile> = Lazy::new(|| {
    TlsProfile::custom(
        &[],
        &[
            "TLS_AES_128_GCM_SHA256",
            "TLS_AES_256_GCM_SHA384",
            "TLS_CHACHA20_POLY1305_SHA256",
        ],
        &[TlsVersion::Tls1_3],
    )
});

/// Recommended configuration for a general-purpose server
pub static INTERMEDIATE: Lazy<TlsProfile> = Lazy::new(|| {
    TlsProfile::custom(
        &[
            "ECDHE-ECDSA-AES128-GCM-SHA256",
            "ECDHE-RSA-AES128-GCM-SHA256",
            "ECDHE-ECDSA-AES256-GCM-SHA384",
            "ECDHE-RSA-AES256-GCM-SHA384",
            "ECDHE-ECDSA-CHACHA20-POLY1305",
            "ECDHE-RSA-CHACHA20-POLY1305",
            "DHE-RSA-AES128-GCM-SHA256",
            "DHE-RSA-AES256-GCM-SHA384",
            "DHE-RSA-CHACHA20-POLY1305",
        ],
        &[
            "TLS_AES_128_GCM_SHA256",
            "TLS_AES_256_GCM_SHA384",
            "TLS_CHACHA20_POLY1305_SHA256",
        ],
        &[TlsVersion::Tls1_2, TlsVersion::Tls1_3],
    )
});

/// For services accessed by very old clients or libraries, such as Internet
/// Explorer 8 (Windows XP), Java 6, or OpenSSL 0.9.8
pub static OLD: Lazy<TlsProfile> = Lazy::new(|| {
    TlsProfile::custom(
        &[
            "ECDHE-ECDSA-AES128-GCM-SHA256",
            "ECDHE-RSA-AES128-GCM-SHA256",
            "ECDHE-ECDSA-AES256-GCM-SHA384",
            "ECDHE-RSA-AES256-GCM-SHA384",
            "ECDHE-ECDSA-CHACHA20-POLY1305",
            "ECDHE-RSA-CHACHA20-POLY1305",
            "DHE-RSA-AES128-GCM-SHA256",
            "DHE-RSA-AES256-GCM-SHA384",
            "DHE-RSA-CHACHA20-POLY1305",
            "ECDHE-ECDSA-AES128-SHA256",
            "ECDHE-RSA-AES128-SHA256",
            "ECDHE-ECDSA-AES128-SHA",
            "ECDHE-RSA-AES128-SHA",
            "ECDHE-ECDSA-AES256-SHA384",
            "ECDHE-RSA-AES256-SHA384",
            "ECDHE-ECDSA-AES256-SHA",
            "ECDHE-RSA-AES256-SHA",
            "DHE-RSA-AES128-SHA256",
            "DHE-RSA-AES256-SHA256",
            "AES128-GCM-SHA256",
            "AES256-GCM-SHA384",
            "AES128-SHA256",
            "AES256-SHA256",
            "AES128-SHA",
            "AES256-SHA",
            "DES-CBC3-SHA",
        ],
        &[
            "TLS_AES_128_GCM_SHA256",
            "TLS_AES_256_GCM_SHA384",
            "TLS_CHACHA20_POLY1305_SHA256",
        ],
        &[
            TlsVersion::Tls1,
            TlsVersion::Tls1_1,
            TlsVersion::Tls1_2,
            TlsVersion::Tls1_3,
        ],
    )
});

impl TlsProfile {
    /// Build a custom profile from explicit cipher and protocol lists
    pub fn custom(
        cipher_list: &[&str],
        tls13_cipher_suites: &[&str],
        protocols: &[TlsVersion],
    ) -> Self {
        let mut protocols = protocols.to_vec();
        protocols.sort();
        protocols.dedup();

        Self {
            cipher_list: cipher_list.iter().map(|s| s.to_string()).collect(),
            tls13_cipher_suites: tls13_cipher_suites.iter().map(|s| s.to_string()).collect(),
            protocols,
        }
    }

    pub fn modern() -> &'static TlsProfile {
        &MODERN
    }

    pub fn intermediate() -> &'static TlsProfile {
        &INTERMEDIATE
    }

    pub fn old() -> &'static TlsProfile {
        &OLD
    }

    /// Look up a preset by name (case-insensitive)
    pub fn from_name(name: &str) -> Result<&'static TlsProfile> {
        match name.to_lowercase().as_str() {
            "modern" => Ok(Self::modern()),
            "intermediate" => Ok(Self::intermediate()),
            "old" => Ok(Self::old()),
            _ => Err(TlsError::Config(format!(
                "invalid TLS profile: {}. Valid values are: modern, intermediate, old",
                name
            ))),
        }
    }

    /// Pre-TLS1.3 cipher names (OpenSSL format)
    pub fn cipher_list(&self) -> &[String] {
        &self.cipher_list
    }

    /// TLS1.3 cipher-suite names
    pub fn tls13_cipher_suites(&self) -> &[String] {
        &self.tls13_cipher_suites
    }

    /// The full cipher-suite allow-list, both protocol generations unioned
    pub fn cipher_suites(&self) -> Vec<&str> {
        self.tls13_cipher_suites
            .iter()
            .map(String::as_str)
            .chain(self.cipher_list.iter().map(String::as_str))
            .collect()
    }

    /// Allowed protocol versions, oldest first
    pub fn protocols(&self) -> &[TlsVersion] {
        &self.protocols
    }

    /// Oldest allowed protocol version
    pub fn min_protocol(&self) -> Option<TlsVersion> {
        self.protocols.first().copied()
    }

    /// Newest allowed protocol version
    pub fn max_protocol(&self) -> Option<TlsVersion> {
        self.protocols.last().copied()
    }

    /// Versions inside the min/max range that the allow-list skips
    pub fn excluded_protocols(&self) -> Vec<TlsVersion> {
        let (min, max) = match (self.min_protocol(), self.max_protocol()) {
            (Some(min), Some(max)) => (min, max),
            _ => return Vec::new(),
        };

        TlsVersion::ALL
            .iter()
            .copied()
            .filter(|v| *v > min && *v < max && !self.protocols.contains(v))
            .collect()
    }

    /// The cipher list as an OpenSSL colon-separated string
    pub fn openssl_cipher_list(&self) -> String {
        self.cipher_list.join(":")
    }

    /// The TLS1.3 suites as an OpenSSL colon-separated string
    pub fn openssl_cipher_suites(&self) -> String {
        self.tls13_cipher_suites.join(":")
    }
}

impl Default for TlsProfile {
    /// The intermediate preset, as recommended for general-purpose servers
    fn default() -> Self {
        Self::intermediate().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modern_is_tls13_only() {
        let modern = TlsProfile::modern();
        assert_eq!(modern.protocols(), &[TlsVersion::Tls1_3]);
        assert!(modern.cipher_list().is_empty());
        assert_eq!(modern.tls13_cipher_suites().len(), 3);
    }

    #[test]
    fn test_intermediate_is_default() {
        assert_eq!(&TlsProfile::default(), TlsProfile::intermediate());
        assert_eq!(
            TlsProfile::intermediate().protocols(),
            &[TlsVersion::Tls1_2, TlsVersion::Tls1_3]
        );
    }

    #[test]
    fn test_permissiveness_ordering() {
        // OLD admits everything INTERMEDIATE does, which admits everything
        // MODERN does.
        let modern = TlsProfile::modern();
        let intermediate = TlsProfile::intermediate();
        let old = TlsProfile::old();

        for suite in modern.cipher_suites() {
            assert!(intermediate.cipher_suites().contains(&suite));
        }
        for suite in intermediate.cipher_suites() {
            assert!(old.cipher_suites().contains(&suite));
        }
        for protocol in modern.protocols() {
            assert!(intermediate.protocols().contains(protocol));
        }
        for protocol in intermediate.protocols() {
            assert!(old.protocols().contains(protocol));
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(TlsProfile::from_name("modern").unwrap(), TlsProfile::modern());
        assert_eq!(TlsProfile::from_name("OLD").unwrap(), TlsProfile::old());
        assert!(TlsProfile::from_name("paranoid").is_err());
    }

    #[test]
    fn test_version_round_trip() {
        for version in TlsVersion::ALL {
            let name = version.to_string();
            assert_eq!(name.parse::<TlsVersion>().unwrap(), version);
        }
        assert!("SSLv3".parse::<TlsVersion>().is_err());
    }

    #[test]
    fn test_excluded_protocols() {
        let profile = TlsProfile::custom(&[], &[], &[TlsVersion::Tls1, TlsVersion::Tls1_3]);
        assert_eq!(
            profile.excluded_protocols(),
            vec![TlsVersion::Tls1_1, TlsVersion::Tls1_2]
        );

        assert!(TlsProfile::old().excluded_protocols().is_empty());
    }
}
