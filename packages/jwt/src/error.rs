//! JWT error types

use thiserror::Error;

/// JWT operation result type
pub type JwtResult<T> = Result<T, JwtError>;

/// Errors produced while encoding or decoding a token.
///
/// Decode failures are reported in the order the checks run: structural
/// problems first, then the signature, then the time window, then any
/// configured claim expectations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Wrong segment count, undecodable base64, bad header JSON or a
    /// `typ` other than `JWT`.
    #[error("Malformed token: {0}")]
    MalformedToken(&'static str),

    /// The payload JSON does not fit the requested destination type.
    #[error("Payload does not match destination type: {0}")]
    Payload(#[source] serde_json::Error),

    /// Header or payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Recomputed signature does not match the token's signature.
    #[error("Token signature verification failed")]
    VerificationFailed,

    /// Current time is past the `exp` claim.
    #[error("Token expired")]
    Expired,

    /// Current time is before the `nbf` claim.
    #[error("Token is not active yet")]
    NotYetActive,

    /// Header names a signer tag with no known hash mapping.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Key rejected by the MAC implementation.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// `iss` does not match the expected issuer.
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// `aud` does not match the expected audience.
    #[error("Invalid token audience")]
    InvalidAudience,

    /// `sub` does not match the expected subject.
    #[error("Token subject does not match")]
    SubjectMismatch,

    /// The operating system random source failed.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),
}

impl JwtError {
    /// Create a malformed token error
    #[inline]
    #[must_use]
    pub fn malformed(reason: &'static str) -> Self {
        JwtError::MalformedToken(reason)
    }

    /// Create an unsupported algorithm error
    #[inline]
    #[must_use]
    pub fn unsupported_algorithm(alg: &str) -> Self {
        JwtError::UnsupportedAlgorithm(alg.to_string())
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: &str) -> Self {
        JwtError::InvalidKey(msg.to_string())
    }

    /// True for failures caused by the token's structure rather than its
    /// signature or claims.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, JwtError::MalformedToken(_))
    }
}
