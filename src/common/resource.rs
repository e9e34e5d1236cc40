//! Bundled-resource resolution
//!
//! Identity and trust material can be addressed by resource name instead of
//! an absolute path, the way an application ships certificates alongside its
//! binary. A name is resolved against, in order:
//!
//! 1. every directory listed in the `TLS_HOTSWAP_RESOURCE_PATH` environment
//!    variable (platform path-separator delimited),
//! 2. directories registered at runtime with [`add_resource_root`],
//! 3. the `resources/` directory under the current working directory.
//!
//! A name that resolves nowhere is an [`TlsError::InvalidResourceLocation`],
//! which is deliberately distinct from a content parse error: the caller can
//! tell "wrong name" apart from "bad file".

use std::env;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::debug;
use once_cell::sync::Lazy;

use super::error::{TlsError, Result};
use super::fs::read_file;

/// Environment variable listing extra resource directories
pub const RESOURCE_PATH_ENV: &str = "TLS_HOTSWAP_RESOURCE_PATH";

/// Default resource directory, relative to the working directory
const DEFAULT_RESOURCE_DIR: &str = "resources";

static RESOURCE_ROOTS: Lazy<RwLock<Vec<PathBuf>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Register an additional directory to search for named resources
///
/// Registered roots are searched after the environment variable and before
/// the default `resources/` directory. Registration is process-wide.
pub fn add_resource_root(root: impl Into<PathBuf>) {
    let root = root.into();
    debug!("Registering resource root: {}", root.display());
    RESOURCE_ROOTS
        .write()
        .expect("resource root lock poisoned")
        .push(root);
}

/// Resolve a resource name to a path on disk
pub fn resolve_resource(name: &str) -> Result<PathBuf> {
    if let Ok(path_list) = env::var(RESOURCE_PATH_ENV) {
        for root in env::split_paths(&path_list) {
            if let Some(found) = probe(&root, name) {
                return Ok(found);
            }
        }
    }

    {
        let roots = RESOURCE_ROOTS.read().expect("resource root lock poisoned");
        for root in roots.iter() {
            if let Some(found) = probe(root, name) {
                return Ok(found);
            }
        }
    }

    if let Some(found) = probe(Path::new(DEFAULT_RESOURCE_DIR), name) {
        return Ok(found);
    }

    Err(TlsError::InvalidResourceLocation(name.to_string()))
}

/// Read a named resource into memory
pub fn read_resource(name: &str) -> Result<Vec<u8>> {
    let path = resolve_resource(name)?;
    debug!("Resolved resource {} to {}", name, path.display());
    read_file(&path)
}

fn probe(root: &Path, name: &str) -> Option<PathBuf> {
    let candidate = root.join(name);
    if candidate.is_file() {
        Some(candidate)
    } else {
        None
    }
}
