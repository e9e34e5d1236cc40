//! TLS handling module
//!
//! Identity and trust resolution, security profiles, material parsing, and
//! the hot-swappable server context.

pub mod context;
pub mod identity;
pub mod material;
pub mod profile;
pub mod trust;

pub use context::{build_acceptor, ContextPolicy, TlsContext};
pub use identity::{resolve as resolve_identity, ResolvedIdentity};
pub use profile::{TlsProfile, TlsVersion};
pub use trust::{resolve as resolve_trust, ResolvedTrust};
