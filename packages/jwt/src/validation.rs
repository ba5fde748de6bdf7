//! Decode-time validation options.

use crate::error::{JwtError, JwtResult};
use crate::header::Header;
use chrono::{DateTime, Duration, Utc};

/// What the decoder checks once a token's signature has been verified.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Leeway for time-based claims.
    pub leeway: Duration,
    /// Validate expiry.
    pub validate_exp: bool,
    /// Validate not-before.
    pub validate_nbf: bool,
    /// Expected issuer.
    pub expected_issuer: Option<String>,
    /// Expected audience.
    pub expected_audience: Option<String>,
    /// Expected subject.
    pub expected_subject: Option<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            leeway: Duration::zero(),
            validate_exp: true,
            validate_nbf: true,
            expected_issuer: None,
            expected_audience: None,
            expected_subject: None,
        }
    }
}

impl ValidationOptions {
    /// Create strict validation options with no leeway.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Set the time leeway for validation.
    #[must_use]
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Set whether to validate expiration.
    #[must_use]
    pub fn validate_expiration(mut self, validate: bool) -> Self {
        self.validate_exp = validate;
        self
    }

    /// Set whether to validate not-before.
    #[must_use]
    pub fn validate_not_before(mut self, validate: bool) -> Self {
        self.validate_nbf = validate;
        self
    }

    /// Set expected issuer.
    #[must_use]
    pub fn expect_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.expected_issuer = Some(issuer.into());
        self
    }

    /// Set expected audience.
    #[must_use]
    pub fn expect_audience(mut self, audience: impl Into<String>) -> Self {
        self.expected_audience = Some(audience.into());
        self
    }

    /// Set expected subject.
    #[must_use]
    pub fn expect_subject(mut self, subject: impl Into<String>) -> Self {
        self.expected_subject = Some(subject.into());
        self
    }

    /// Check the claims of an already verified header, in order: expiry,
    /// not-before, issuer, audience, subject.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as [`JwtError::Expired`],
    /// [`JwtError::NotYetActive`], [`JwtError::InvalidIssuer`],
    /// [`JwtError::InvalidAudience`] or [`JwtError::SubjectMismatch`].
    pub fn check(&self, header: &Header, now: DateTime<Utc>) -> JwtResult<()> {
        // Leeway widens the window on both sides.
        if self.validate_exp && header.is_expired_at(shift(now, -self.leeway)) {
            return Err(JwtError::Expired);
        }
        if self.validate_nbf && !header.has_started_at(shift(now, self.leeway)) {
            return Err(JwtError::NotYetActive);
        }

        if let Some(expected) = &self.expected_issuer {
            if header.issuer() != Some(expected.as_str()) {
                return Err(JwtError::InvalidIssuer);
            }
        }
        if let Some(expected) = &self.expected_audience {
            if header.audience() != Some(expected.as_str()) {
                return Err(JwtError::InvalidAudience);
            }
        }
        if let Some(expected) = &self.expected_subject {
            if header.subject() != Some(expected.as_str()) {
                return Err(JwtError::SubjectMismatch);
            }
        }
        Ok(())
    }
}

fn shift(now: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    now.checked_add_signed(by).unwrap_or(now)
}
