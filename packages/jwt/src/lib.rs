//! Compact HMAC-signed JSON Web Tokens
//!
//! This crate provides:
//! - `encode` / `decode` for `header.payload.signature` tokens
//! - HMAC over SHA-256, SHA-224, SHA-512, SHA-384, SHA-512/256 and SHA-512/224
//! - Expiration and not-before validation against an injectable clock
//! - Key derivation and generation helpers
//!
//! ```
//! use hmac_jwt::{decode, encode, Header, SignType};
//! use chrono::Duration;
//! use serde_json::json;
//!
//! let key = hmac_jwt::derive_key("shared secret");
//! let header = Header::new()
//!     .with_signer(SignType::Hs512)
//!     .with_subject("alice")
//!     .expires_in(Duration::minutes(10));
//! let token = encode(Some(&header), &json!({"scope": "read"}), &key)?;
//!
//! let decoded = decode::<serde_json::Value>(&token, &key)?;
//! assert_eq!(decoded.header.subject(), Some("alice"));
//! assert_eq!(decoded.payload["scope"], "read");
//! # Ok::<(), hmac_jwt::JwtError>(())
//! ```

mod algorithms;
mod codec;
mod error;
mod header;
mod keys;
mod traits;
mod validation;

pub use algorithms::SignType;
pub use codec::{decode, decode_bytes, encode, encode_to_vec, Codec, Decoded};
pub use error::{JwtError, JwtResult};
pub use header::{Header, TOKEN_TYPE};
pub use keys::{derive_key, generate_key, DERIVED_KEY_LEN, GENERATED_KEY_LEN};
pub use traits::{Clock, FixedClock, SystemClock};
pub use validation::ValidationOptions;
