//! TLS context construction and hot swap
//!
//! The context factory combines a resolved identity, optional trust
//! anchors, the security profile and the selected provider into an OpenSSL
//! acceptor. A [`TlsContext`] wraps that acceptor behind an atomically
//! swapped handle: every incoming handshake dereferences the current handle
//! once, and the reload path installs a replacement handle under a writer
//! lock. A handshake therefore completes entirely against the material it
//! loaded; it can never observe a torn mix of old and new material.
//!
//! Cipher, protocol, ALPN and SNI policy is captured in a [`ContextPolicy`]
//! at the initial build and reused verbatim for every reload snapshot:
//! reloading changes identity and trust material only.

use std::pin::Pin;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use log::{debug, info};
use openssl::ssl::{
    self, AlpnError, NameType, SniError, Ssl, SslAcceptor, SslAcceptorBuilder, SslMethod,
    SslVerifyMode,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_openssl::SslStream;

use crate::common::error::{TlsError, Result};
use crate::crypto::provider::SecurityProvider;
use crate::tls::identity::ResolvedIdentity;
use crate::tls::profile::TlsProfile;
use crate::tls::trust::ResolvedTrust;

/// ALPN protocol list offered when HTTP/2 is enabled: h2, then http/1.1
const ALPN_H2_HTTP11: &[u8] = b"\x02h2\x08http/1.1";

/// Policy fixed for the lifetime of a context
///
/// Snapshotted from the server config at the initial build; reloads reuse
/// it so only identity and trust material can change at runtime.
#[derive(Debug, Clone)]
pub struct ContextPolicy {
    /// Cipher and protocol allow-lists
    pub profile: TlsProfile,
    /// Offer h2 through ALPN
    pub alpn_h2: bool,
    /// Reject handshakes whose SNI name does not match the certificate
    pub sni_host_check: bool,
    /// Backend tuning provider
    pub provider: Arc<dyn SecurityProvider>,
}

/// A server TLS context with hot-swappable material
pub struct TlsContext {
    material: ArcSwap<SslAcceptor>,
    reload_lock: Mutex<()>,
    policy: ContextPolicy,
}

impl TlsContext {
    /// Build a swappable context from resolved material
    pub fn build(
        identity: ResolvedIdentity,
        trust: Option<ResolvedTrust>,
        policy: ContextPolicy,
    ) -> Result<Self> {
        let acceptor = build_acceptor(identity, trust, &policy)?;

        Ok(Self {
            material: ArcSwap::from_pointee(acceptor),
            reload_lock: Mutex::new(()),
            policy,
        })
    }

    /// The currently installed acceptor
    ///
    /// Reader path: called once per incoming handshake. The returned handle
    /// stays valid for that handshake even if a swap happens concurrently.
    pub fn acceptor(&self) -> Arc<SslAcceptor> {
        self.material.load_full()
    }

    /// The policy captured at the initial build
    pub fn policy(&self) -> &ContextPolicy {
        &self.policy
    }

    /// Replace the live material with a freshly built snapshot
    ///
    /// Swaps are serialized: concurrent reloads take turns, and the last
    /// one to acquire the lock determines the final state. A build failure
    /// leaves the previous material installed and serving.
    pub(crate) fn swap_material(
        &self,
        identity: ResolvedIdentity,
        trust: Option<ResolvedTrust>,
    ) -> Result<()> {
        let _guard = self.reload_lock.lock().expect("reload lock poisoned");

        let snapshot = build_acceptor(identity, trust, &self.policy)?;
        self.material.store(Arc::new(snapshot));

        info!("TLS material swapped");
        Ok(())
    }

    /// Terminate TLS on an accepted connection
    ///
    /// Performs the handshake against whatever material is current at call
    /// time.
    pub async fn accept<S>(&self, stream: S) -> Result<SslStream<S>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let acceptor = self.acceptor();
        let ssl = Ssl::new(acceptor.context()).map_err(TlsError::Ssl)?;
        let mut stream = SslStream::new(ssl, stream).map_err(TlsError::Ssl)?;

        Pin::new(&mut stream)
            .accept()
            .await
            .map_err(|e| TlsError::TlsHandshake(e.to_string()))?;

        debug!("TLS handshake successful");
        Ok(stream)
    }
}

/// Build an acceptor from resolved material and a fixed policy
///
/// This is the non-swappable snapshot path; [`TlsContext::build`] wraps its
/// result in the swappable handle.
pub fn build_acceptor(
    identity: ResolvedIdentity,
    trust: Option<ResolvedTrust>,
    policy: &ContextPolicy,
) -> Result<SslAcceptor> {
    let mut builder = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls_server())?;

    apply_identity(&mut builder, &identity)?;
    apply_trust(&mut builder, trust)?;
    apply_profile(&mut builder, &policy.profile)?;

    if policy.alpn_h2 {
        builder.set_alpn_select_callback(|_ssl, client_protos| {
            ssl::select_next_proto(ALPN_H2_HTTP11, client_protos).ok_or(AlpnError::NOACK)
        });
    }

    if policy.sni_host_check {
        let valid_names = identity.dns_names();
        builder.set_servername_callback(move |ssl, _alert| {
            match ssl.servername(NameType::HOST_NAME) {
                Some(server_name)
                    if !valid_names.iter().any(|n| hostname_matches(n, server_name)) =>
                {
                    Err(SniError::ALERT_FATAL)
                }
                _ => Ok(()),
            }
        });
    }

    policy.provider.configure(&mut builder)?;

    Ok(builder.build())
}

fn apply_identity(builder: &mut SslAcceptorBuilder, identity: &ResolvedIdentity) -> Result<()> {
    builder.set_certificate(&identity.cert)?;
    builder.set_private_key(&identity.key)?;
    for chain_cert in &identity.chain {
        builder.add_extra_chain_cert(chain_cert.clone())?;
    }
    builder.check_private_key()?;
    Ok(())
}

fn apply_trust(builder: &mut SslAcceptorBuilder, trust: Option<ResolvedTrust>) -> Result<()> {
    match trust {
        Some(trust) => {
            // Advertise the anchors as acceptable CAs, then demand a
            // client certificate chaining to one of them.
            for anchor in &trust.anchors {
                builder.add_client_ca(anchor)?;
            }
            builder.set_verify_cert_store(trust.store)?;
            builder.set_verify(SslVerifyMode::PEER | SslVerifyMode::FAIL_IF_NO_PEER_CERT);
            info!("Client certificates required (will be verified)");
        }
        None => {
            builder.set_verify(SslVerifyMode::NONE);
            debug!("No trust material configured, accepting any client");
        }
    }
    Ok(())
}

fn apply_profile(builder: &mut SslAcceptorBuilder, profile: &TlsProfile) -> Result<()> {
    let cipher_list = profile.openssl_cipher_list();
    if !cipher_list.is_empty() {
        builder.set_cipher_list(&cipher_list)?;
    }

    let cipher_suites = profile.openssl_cipher_suites();
    if !cipher_suites.is_empty() {
        builder.set_ciphersuites(&cipher_suites)?;
    }

    // Undo any version disables inherited from the base preset, then pin
    // the profile's range.
    for allowed in profile.protocols() {
        builder.clear_options(allowed.disable_option());
    }
    builder.set_min_proto_version(profile.min_protocol().map(|v| v.openssl_version()))?;
    builder.set_max_proto_version(profile.max_protocol().map(|v| v.openssl_version()))?;

    // The allow-list may skip versions inside the min/max range.
    for excluded in profile.excluded_protocols() {
        builder.set_options(excluded.disable_option());
    }

    Ok(())
}

/// Case-insensitive hostname match with support for a leftmost wildcard
/// label, as in `*.example.com`
fn hostname_matches(pattern: &str, hostname: &str) -> bool {
    let pattern = pattern.to_ascii_lowercase();
    let hostname = hostname.to_ascii_lowercase();

    if let Some(suffix) = pattern.strip_prefix("*.") {
        match hostname.split_once('.') {
            Some((label, rest)) => !label.is_empty() && rest == suffix,
            None => false,
        }
    } else {
        pattern == hostname
    }
}
