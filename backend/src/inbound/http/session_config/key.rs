//! Session key loading and fingerprinting.

use std::path::Path;

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

use super::{BuildMode, SESSION_KEY_MIN_LEN, SessionConfigError};

const FINGERPRINT_BYTES: usize = 8;

/// Derive the cookie key from the file at `path`.
///
/// Without a readable file, debug builds and deployments that opt in with
/// `SESSION_ALLOW_EPHEMERAL` get a generated key.
pub(super) fn load(
    path: &Path,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    match std::fs::read(path).map(Zeroizing::new) {
        Ok(bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                return Err(SessionConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            Ok(Key::derive_from(&bytes))
        }
        Err(source) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "using temporary session key; sessions end on restart"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// First eight bytes of the SHA-256 of the signing key, hex encoded.
///
/// ```
/// use actix_web::cookie::Key;
/// use recordkeeper::inbound::http::session_config::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::derive_from(&[7; 64]));
/// assert_eq!(fp.len(), 16);
/// assert_eq!(fp, key_fingerprint(&Key::derive_from(&[7; 64])));
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
}
