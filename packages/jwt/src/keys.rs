//! Key material helpers.
//!
//! Neither helper is used by the codec itself. `derive_key` is a plain
//! SHA-512 digest with no salt and no work factor, so it only suits inputs
//! that already carry enough entropy; it is not a password hash.

use crate::error::{JwtError, JwtResult};
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha512};
use zeroize::Zeroizing;

/// Length of a key produced by [`derive_key`].
pub const DERIVED_KEY_LEN: usize = 64;

/// Length of a key produced by [`generate_key`] (the SHA-512 block size).
pub const GENERATED_KEY_LEN: usize = 128;

/// Derive a 64-byte key from arbitrary bytes or a string.
#[must_use]
pub fn derive_key(data: impl AsRef<[u8]>) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(Sha512::digest(data.as_ref()).to_vec())
}

/// Generate 128 bytes of key material from the operating system's secure
/// random source.
///
/// # Errors
///
/// Returns [`JwtError::KeyGeneration`] if the random source fails.
pub fn generate_key() -> JwtResult<Zeroizing<Vec<u8>>> {
    let mut key = Zeroizing::new(vec![0u8; GENERATED_KEY_LEN]);
    OsRng.try_fill_bytes(key.as_mut_slice()).map_err(|e| {
        tracing::error!(error = %e, "secure random source failed");
        JwtError::KeyGeneration(e.to_string())
    })?;
    Ok(key)
}
