//! Keyed-hash signer algorithms
//!
//! Every supported tag maps to an HMAC over a member of the SHA-2 family.
//! Tags are matched case-insensitively; signatures are compared in
//! constant time.

use crate::error::{JwtError, JwtResult};
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

/// Supported HMAC signer algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignType {
    /// HMAC-SHA-512
    Hs512,
    /// HMAC-SHA-384
    Hs384,
    /// HMAC-SHA-512/256
    Hs512_256,
    /// HMAC-SHA-512/224
    Hs512_224,
    /// HMAC-SHA-256
    Hs256,
    /// HMAC-SHA-224
    Hs224,
}

impl SignType {
    /// Algorithm used when the caller does not pick one.
    pub const DEFAULT: SignType = SignType::Hs256;

    /// Every supported algorithm.
    pub const ALL: [SignType; 6] = [
        SignType::Hs512,
        SignType::Hs384,
        SignType::Hs512_256,
        SignType::Hs512_224,
        SignType::Hs256,
        SignType::Hs224,
    ];

    /// Canonical wire tag, as written into the `alg` header key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SignType::Hs512 => "HS512",
            SignType::Hs384 => "HS384",
            SignType::Hs512_256 => "HS512/256",
            SignType::Hs512_224 => "HS512/224",
            SignType::Hs256 => "HS256",
            SignType::Hs224 => "HS224",
        }
    }

    /// Length in bytes of the signatures this algorithm produces.
    #[must_use]
    pub const fn signature_len(&self) -> usize {
        match self {
            SignType::Hs512 => 64,
            SignType::Hs384 => 48,
            SignType::Hs512_256 | SignType::Hs256 => 32,
            SignType::Hs512_224 | SignType::Hs224 => 28,
        }
    }

    /// Compute the MAC of the concatenation of `parts` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::InvalidKey`] if the MAC rejects the key.
    pub fn sign(&self, key: &[u8], parts: &[&[u8]]) -> JwtResult<Vec<u8>> {
        match self {
            SignType::Hs512 => mac::<Hmac<Sha512>>(key, parts),
            SignType::Hs384 => mac::<Hmac<Sha384>>(key, parts),
            SignType::Hs512_256 => mac::<Hmac<Sha512_256>>(key, parts),
            SignType::Hs512_224 => mac::<Hmac<Sha512_224>>(key, parts),
            SignType::Hs256 => mac::<Hmac<Sha256>>(key, parts),
            SignType::Hs224 => mac::<Hmac<Sha224>>(key, parts),
        }
    }

    /// Recompute the MAC of `parts` and compare it with `signature` in
    /// constant time.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::InvalidKey`] if the MAC rejects the key.
    pub fn verify(&self, key: &[u8], parts: &[&[u8]], signature: &[u8]) -> JwtResult<bool> {
        let expected = self.sign(key, parts)?;
        Ok(expected.ct_eq(signature).into())
    }
}

fn mac<M: Mac + KeyInit>(key: &[u8], parts: &[&[u8]]) -> JwtResult<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|_| JwtError::invalid_key("Invalid HMAC key"))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

impl Default for SignType {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for SignType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignType {
    type Err = JwtError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_ascii_uppercase().as_str() {
            "HS512" => Ok(SignType::Hs512),
            "HS384" => Ok(SignType::Hs384),
            "HS512/256" => Ok(SignType::Hs512_256),
            "HS512/224" => Ok(SignType::Hs512_224),
            "HS256" => Ok(SignType::Hs256),
            "HS224" => Ok(SignType::Hs224),
            _ => Err(JwtError::unsupported_algorithm(tag)),
        }
    }
}

impl Serialize for SignType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SignType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
