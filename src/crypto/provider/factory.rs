//! Security provider factory
//!
//! Selects a provider based on the caller's request and the current
//! platform. Auto-selection consults a capability table keyed by
//! (OS, architecture); unsupported platforms fall back to the standard
//! provider. Selection never fails.

use std::env::consts::{ARCH, OS};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::{AcceleratedProvider, ProviderSelection, SecurityProvider, StandardProvider};

// Provider singletons, initialized on first selection
static STANDARD_PROVIDER: OnceCell<Arc<StandardProvider>> = OnceCell::new();
static ACCELERATED_PROVIDER: OnceCell<Arc<AcceleratedProvider>> = OnceCell::new();

// Logging flags to avoid duplicate logs
static LOGGED_SELECTION: OnceCell<bool> = OnceCell::new();
static LOGGED_FALLBACK: OnceCell<bool> = OnceCell::new();

/// 64-bit platforms where the tuned provider applies
const ACCELERATED_PLATFORMS: &[(&str, &str)] = &[
    ("linux", "x86_64"),
    ("linux", "aarch64"),
    ("macos", "x86_64"),
    ("macos", "aarch64"),
    ("windows", "x86_64"),
];

/// Whether the current OS and architecture support the tuned provider
pub fn platform_supports_acceleration() -> bool {
    supports_acceleration(OS, ARCH)
}

fn supports_acceleration(os: &str, arch: &str) -> bool {
    ACCELERATED_PLATFORMS
        .iter()
        .any(|&(table_os, table_arch)| table_os == os && table_arch == arch)
}

fn standard() -> Arc<dyn SecurityProvider> {
    STANDARD_PROVIDER
        .get_or_init(|| Arc::new(StandardProvider::new()))
        .clone()
}

fn accelerated() -> Arc<dyn SecurityProvider> {
    ACCELERATED_PROVIDER
        .get_or_init(|| Arc::new(AcceleratedProvider::new()))
        .clone()
}

/// Select a security provider
///
/// Explicit selections are honored; `Auto` consults the platform table and
/// falls back to the standard provider on unsupported platforms. This
/// function never fails; the absence of a tuned provider is not an error.
pub fn select_provider(selection: &ProviderSelection) -> Arc<dyn SecurityProvider> {
    match selection {
        ProviderSelection::Custom(provider) => provider.clone(),
        ProviderSelection::Standard => standard(),
        ProviderSelection::Accelerated => {
            if platform_supports_acceleration() {
                accelerated()
            } else {
                if LOGGED_FALLBACK.get().is_none() {
                    log::warn!(
                        "Accelerated provider not supported on {}/{}, falling back to standard provider",
                        OS,
                        ARCH
                    );
                    LOGGED_FALLBACK.set(true).ok();
                }
                standard()
            }
        }
        ProviderSelection::Auto => {
            if platform_supports_acceleration() {
                if LOGGED_SELECTION.get().is_none() {
                    log::info!("Using accelerated security provider for {}/{}", OS, ARCH);
                    LOGGED_SELECTION.set(true).ok();
                }
                accelerated()
            } else {
                if LOGGED_FALLBACK.get().is_none() {
                    log::warn!(
                        "No tuned provider for {}/{}, using platform default",
                        OS,
                        ARCH
                    );
                    LOGGED_FALLBACK.set(true).ok();
                }
                standard()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_table() {
        assert!(supports_acceleration("linux", "x86_64"));
        assert!(supports_acceleration("macos", "aarch64"));
        assert!(supports_acceleration("windows", "x86_64"));

        // 32-bit and unlisted platforms fall back
        assert!(!supports_acceleration("linux", "x86"));
        assert!(!supports_acceleration("windows", "aarch64"));
        assert!(!supports_acceleration("freebsd", "x86_64"));
    }

    #[test]
    fn test_explicit_selection_is_honored() {
        let provider = select_provider(&ProviderSelection::Standard);
        assert_eq!(provider.name(), "standard");
    }

    #[test]
    fn test_auto_selection_never_fails() {
        // Whatever the host platform, a provider comes back.
        let provider = select_provider(&ProviderSelection::Auto);
        assert!(!provider.capabilities().recommended_groups.is_empty());
    }

    #[test]
    fn test_custom_provider_is_used_as_is() {
        let custom: Arc<dyn SecurityProvider> = Arc::new(StandardProvider::new());
        let provider = select_provider(&ProviderSelection::Custom(custom.clone()));
        assert_eq!(provider.name(), custom.name());
    }
}
