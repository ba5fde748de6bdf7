//! Token encoding and decoding.
//!
//! A token is `b64(header-json).b64(payload-json).b64(mac)` with unpadded
//! URL-safe base64. The MAC covers `header-json ++ "." ++ payload-json`.
//! Decoding runs its checks in a fixed order and stops at the first failure;
//! the signature is always verified before any claim is looked at.

use crate::algorithms::SignType;
use crate::error::{JwtError, JwtResult};
use crate::header::{Header, TOKEN_TYPE};
use crate::traits::{Clock, SystemClock};
use crate::validation::ValidationOptions;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

const SEPARATOR: &[u8] = b".";

/// Header and payload recovered from a verified token.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    /// Header as it was signed.
    pub header: Header,
    /// Deserialized payload.
    pub payload: T,
}

/// Encoder/decoder bound to a clock and a set of validation options.
///
/// Cloning is cheap; a `Codec` can be shared freely between threads.
#[derive(Clone)]
pub struct Codec {
    clock: Arc<dyn Clock>,
    validation_options: ValidationOptions,
}

impl Codec {
    /// Codec using the system clock and default validation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            validation_options: ValidationOptions::default(),
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Set custom validation options.
    #[must_use]
    pub fn with_validation_options(mut self, options: ValidationOptions) -> Self {
        self.validation_options = options;
        self
    }

    /// Get a reference to the validation options.
    #[must_use]
    pub fn validation_options(&self) -> &ValidationOptions {
        &self.validation_options
    }

    /// Encode `payload` under `header` (or the default header) and sign it
    /// with `key`. The issue time is stamped on a copy of the header; the
    /// caller's value is left as is.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::Serialization`] if the header or payload cannot
    /// be serialized.
    pub fn encode<P>(&self, header: Option<&Header>, payload: &P, key: &[u8]) -> JwtResult<String>
    where
        P: Serialize + ?Sized,
    {
        let header = header
            .cloned()
            .unwrap_or_default()
            .issued(self.clock.now());
        let signer = header.signer();

        let head = serde_json::to_vec(&header).map_err(JwtError::Serialization)?;
        let body = serde_json::to_vec(payload).map_err(JwtError::Serialization)?;
        let mac = signer.sign(key, &[head.as_slice(), SEPARATOR, body.as_slice()])?;

        let mut token = String::with_capacity((head.len() + body.len() + mac.len()) * 4 / 3 + 4);
        URL_SAFE_NO_PAD.encode_string(&head, &mut token);
        token.push('.');
        URL_SAFE_NO_PAD.encode_string(&body, &mut token);
        token.push('.');
        URL_SAFE_NO_PAD.encode_string(&mac, &mut token);

        tracing::trace!(alg = %signer, len = token.len(), "encoded token");
        Ok(token)
    }

    /// Like [`Codec::encode`] but returns the token bytes.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::Serialization`] if the header or payload cannot
    /// be serialized.
    pub fn encode_to_vec<P>(
        &self,
        header: Option<&Header>,
        payload: &P,
        key: &[u8],
    ) -> JwtResult<Vec<u8>>
    where
        P: Serialize + ?Sized,
    {
        self.encode(header, payload, key).map(String::into_bytes)
    }

    /// Verify `token` with `key` and deserialize its payload into `T`.
    ///
    /// # Errors
    ///
    /// In check order: [`JwtError::MalformedToken`] for structural problems
    /// (or [`JwtError::UnsupportedAlgorithm`] for an unknown `alg`),
    /// [`JwtError::Payload`] if the payload does not fit `T`,
    /// [`JwtError::VerificationFailed`] on a signature mismatch, then the
    /// claim errors raised by [`ValidationOptions::check`].
    pub fn decode<T: DeserializeOwned>(&self, token: &str, key: &[u8]) -> JwtResult<Decoded<T>> {
        let (head_b64, rest) = split_segment(token)?;
        let (body_b64, mac_b64) = split_segment(rest)?;

        let head = decode_segment(head_b64, "undecodable header segment")?;
        let header = parse_header(&head)?;
        let body = decode_segment(body_b64, "undecodable payload segment")?;
        let payload: T = serde_json::from_slice(&body).map_err(|e| {
            tracing::debug!(error = %e, "token payload does not fit destination");
            JwtError::Payload(e)
        })?;
        let mac = decode_segment(mac_b64, "undecodable signature segment")?;

        let signer = header.signer();
        if !signer.verify(key, &[head.as_slice(), SEPARATOR, body.as_slice()], &mac)? {
            tracing::debug!(alg = %signer, "token signature mismatch");
            return Err(JwtError::VerificationFailed);
        }

        self.validation_options
            .check(&header, self.clock.now())
            .inspect_err(|e| tracing::debug!(reason = %e, "token claims rejected"))?;

        Ok(Decoded { header, payload })
    }

    /// Like [`Codec::decode`] for a token held as bytes.
    ///
    /// # Errors
    ///
    /// As [`Codec::decode`]; non-UTF-8 input is a [`JwtError::MalformedToken`].
    pub fn decode_bytes<T: DeserializeOwned>(
        &self,
        token: &[u8],
        key: &[u8],
    ) -> JwtResult<Decoded<T>> {
        let token = std::str::from_utf8(token)
            .map_err(|_| reject("token is not valid UTF-8"))?;
        self.decode(token, key)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec")
            .field("validation_options", &self.validation_options)
            .finish_non_exhaustive()
    }
}

/// Encode with the system clock. See [`Codec::encode`].
///
/// # Errors
///
/// Returns [`JwtError::Serialization`] if the header or payload cannot be
/// serialized.
pub fn encode<P>(header: Option<&Header>, payload: &P, key: &[u8]) -> JwtResult<String>
where
    P: Serialize + ?Sized,
{
    Codec::new().encode(header, payload, key)
}

/// Encode to bytes with the system clock. See [`Codec::encode_to_vec`].
///
/// # Errors
///
/// Returns [`JwtError::Serialization`] if the header or payload cannot be
/// serialized.
pub fn encode_to_vec<P>(header: Option<&Header>, payload: &P, key: &[u8]) -> JwtResult<Vec<u8>>
where
    P: Serialize + ?Sized,
{
    Codec::new().encode_to_vec(header, payload, key)
}

/// Decode with the system clock and default validation. See
/// [`Codec::decode`].
///
/// # Errors
///
/// See [`Codec::decode`].
pub fn decode<T: DeserializeOwned>(token: &str, key: &[u8]) -> JwtResult<Decoded<T>> {
    Codec::new().decode(token, key)
}

/// Decode a byte token with the system clock and default validation.
///
/// # Errors
///
/// See [`Codec::decode_bytes`].
pub fn decode_bytes<T: DeserializeOwned>(token: &[u8], key: &[u8]) -> JwtResult<Decoded<T>> {
    Codec::new().decode_bytes(token, key)
}

fn reject(reason: &'static str) -> JwtError {
    tracing::debug!(reason, "malformed token");
    JwtError::malformed(reason)
}

fn split_segment(input: &str) -> JwtResult<(&str, &str)> {
    input
        .split_once('.')
        .ok_or_else(|| reject("expected three dot-separated segments"))
}

fn decode_segment(segment: &str, reason: &'static str) -> JwtResult<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(segment).map_err(|_| reject(reason))
}

/// Parse the header JSON. The algorithm tag is resolved separately so an
/// unknown tag surfaces as its own error instead of a generic parse failure.
fn parse_header(head: &[u8]) -> JwtResult<Header> {
    let value: Value =
        serde_json::from_slice(head).map_err(|_| reject("header is not valid JSON"))?;

    let typ = value.get("typ").and_then(Value::as_str);
    if !typ.is_some_and(|typ| typ.eq_ignore_ascii_case(TOKEN_TYPE)) {
        return Err(reject("header type is not JWT"));
    }

    let alg = value
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| reject("header has no algorithm"))?;
    if let Err(e) = alg.parse::<SignType>() {
        tracing::debug!(alg, "token names an unsupported algorithm");
        return Err(e);
    }

    serde_json::from_value(value).map_err(|_| reject("header claims are invalid"))
}
