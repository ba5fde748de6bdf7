//! Token header: algorithm tag, issue time and the registered claims.
//!
//! `Header` is an immutable value. Every `with_*` setter consumes the header
//! and returns the updated copy, so a header shared between threads is never
//! mutated behind anyone's back. The encoder stamps `issued_at` on its own
//! copy.

use crate::algorithms::SignType;
use crate::traits::{Clock, SystemClock};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type marker written into every header.
pub const TOKEN_TYPE: &str = "JWT";

/// Token header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(rename = "typ")]
    typ: String,
    #[serde(rename = "alg")]
    signer: SignType,
    #[serde(rename = "isa")]
    issued_at: DateTime<Utc>,
    #[serde(rename = "jti", default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    expiration: Option<DateTime<Utc>>,
    #[serde(rename = "nbf", default, skip_serializing_if = "Option::is_none")]
    not_before: Option<DateTime<Utc>>,
    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    issuer: Option<String>,
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    audience: Option<String>,
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(rename = "ext", default, skip_serializing_if = "Option::is_none")]
    extra: Option<Value>,
}

impl Header {
    /// Header with `typ = "JWT"`, the default signer and no claims.
    #[must_use]
    pub fn new() -> Self {
        Self {
            typ: TOKEN_TYPE.to_string(),
            signer: SignType::DEFAULT,
            issued_at: DateTime::<Utc>::UNIX_EPOCH,
            id: None,
            expiration: None,
            not_before: None,
            issuer: None,
            audience: None,
            subject: None,
            extra: None,
        }
    }

    /// Set the signer algorithm.
    #[must_use]
    pub fn with_signer(mut self, signer: SignType) -> Self {
        self.signer = signer;
        self
    }

    /// Set the token id (`jti`).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set an absolute expiration time (`exp`).
    #[must_use]
    pub fn with_expiration(mut self, at: DateTime<Utc>) -> Self {
        self.expiration = Some(at);
        self
    }

    /// Expire `ttl` from now.
    #[must_use]
    pub fn expires_in(self, ttl: Duration) -> Self {
        self.expires_in_from(&SystemClock, ttl)
    }

    /// Expire `ttl` after the clock's current time.
    #[must_use]
    pub fn expires_in_from(self, clock: &dyn Clock, ttl: Duration) -> Self {
        let at = offset(clock.now(), ttl);
        self.with_expiration(at)
    }

    /// Set an absolute not-before time (`nbf`).
    #[must_use]
    pub fn with_not_before(mut self, at: DateTime<Utc>) -> Self {
        self.not_before = Some(at);
        self
    }

    /// Become active `delay` from now.
    #[must_use]
    pub fn activate_after(self, delay: Duration) -> Self {
        self.activate_after_from(&SystemClock, delay)
    }

    /// Become active `delay` after the clock's current time.
    #[must_use]
    pub fn activate_after_from(self, clock: &dyn Clock, delay: Duration) -> Self {
        let at = offset(clock.now(), delay);
        self.with_not_before(at)
    }

    /// Set the issuer (`iss`).
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the audience (`aud`).
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set the subject (`sub`).
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Attach caller-defined claims (`ext`), serialized as-is. A JSON
    /// `null` clears the claim so it is left off the wire.
    #[must_use]
    pub fn with_extra(mut self, extra: impl Into<Value>) -> Self {
        self.extra = match extra.into() {
            Value::Null => None,
            value => Some(value),
        };
        self
    }

    pub(crate) fn issued(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = at;
        self
    }

    /// Type marker (`typ`).
    #[must_use]
    pub fn token_type(&self) -> &str {
        &self.typ
    }

    /// Signer algorithm (`alg`).
    #[must_use]
    pub fn signer(&self) -> SignType {
        self.signer
    }

    /// Issue time (`isa`), stamped by the encoder.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Token id (`jti`).
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Expiration time (`exp`).
    #[must_use]
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }

    /// Not-before time (`nbf`).
    #[must_use]
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.not_before
    }

    /// Issuer (`iss`).
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    /// Audience (`aud`).
    #[must_use]
    pub fn audience(&self) -> Option<&str> {
        self.audience.as_deref()
    }

    /// Subject (`sub`).
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Caller-defined claims (`ext`).
    #[must_use]
    pub fn extra(&self) -> Option<&Value> {
        self.extra.as_ref()
    }

    /// Deserialize the `ext` claims into `T`. `None` when no extra claims
    /// were attached.
    pub fn extra_as<T: DeserializeOwned>(&self) -> Option<serde_json::Result<T>> {
        self.extra.clone().map(serde_json::from_value)
    }

    /// True iff an expiration is set and lies strictly before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|exp| exp < now)
    }

    /// [`Header::is_expired_at`] against the system clock.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// True iff no not-before is set or it is not after `now`.
    #[must_use]
    pub fn has_started_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before.map_or(true, |nbf| nbf <= now)
    }

    /// True iff `now` falls inside `[not-before, expiration)`. Missing
    /// bounds are open.
    #[must_use]
    pub fn is_within_activity_window_at(&self, now: DateTime<Utc>) -> bool {
        self.has_started_at(now) && !self.is_expired_at(now)
    }

    /// [`Header::is_within_activity_window_at`] against the system clock.
    #[must_use]
    pub fn is_within_activity_window(&self) -> bool {
        self.is_within_activity_window_at(Utc::now())
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

fn offset(now: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    now.checked_add_signed(by).unwrap_or(if by < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
