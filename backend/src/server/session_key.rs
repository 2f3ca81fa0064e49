//! Session signing key loading.
//!
//! The key is derived from the bytes of a mounted secret file. Operators can
//! compare the logged fingerprint against the one in their runbooks without
//! the key material ever reaching the logs.

use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroize;

/// Minimum number of key bytes `Key::derive_from` accepts.
const SESSION_KEY_MIN_LEN: usize = 32;
/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Errors raised while loading the session key.
#[derive(thiserror::Error, Debug)]
pub enum SessionKeyError {
    /// Reading the session key file failed and no fallback is allowed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file is too short to derive a key from.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Load the session key from `path`.
///
/// When the file cannot be read and `allow_ephemeral` is set, a random key
/// is generated; sessions then do not survive a restart.
///
/// # Errors
///
/// [`SessionKeyError`] when the file is unreadable without fallback or holds
/// fewer than 32 bytes.
pub fn load_session_key(path: &Path, allow_ephemeral: bool) -> Result<Key, SessionKeyError> {
    let key = match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionKeyError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            key
        }
        Err(error) if allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key"
            );
            Key::generate()
        }
        Err(error) => {
            return Err(SessionKeyError::KeyRead {
                path: path.to_path_buf(),
                source: error,
            });
        }
    };
    info!(fingerprint = %key_fingerprint(&key), "session key loaded");
    Ok(key)
}

/// Truncated SHA-256 of the signing half of `key`, as 16 hex characters.
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
