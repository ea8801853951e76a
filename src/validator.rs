use crate::claims::{ClaimValue, Claims};
use chrono::{DateTime, Utc};
use std::fmt;

/// Expectations and clock to use when validating claims.
#[derive(Clone, Debug)]
pub struct ValidationOptions {
    /// The expected `iss` claim value. When unset the issuer is not checked.
    pub issuer: Option<String>,

    /// The expected `aud` claim value. When unset the audience is not checked.
    pub audience: Option<String>,

    /// The timestamp to use for temporal checks.
    pub current_time: DateTime<Utc>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self { issuer: None, audience: None, current_time: Utc::now() }
    }
}

impl ValidationOptions {
    /// Expect the given issuer.
    pub fn issuer<T: Into<String>>(mut self, issuer: T) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Expect the given audience.
    pub fn audience<T: Into<String>>(mut self, audience: T) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Use the given timestamp for temporal checks instead of the current time.
    pub fn current_time(mut self, timestamp: DateTime<Utc>) -> Self {
        self.current_time = timestamp;
        self
    }
}

/// The result of validating a set of claims.
///
/// Not an error type: the caller inspects the variant and decides what to do with the token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidateClaimsResult {
    /// Every performed check passed.
    Success,

    /// The `iss` claim does not match the expected issuer.
    MismatchedIssuer,

    /// The `aud` claim does not match the expected audience.
    MismatchedAudience,

    /// The `aud` claim contains more than one audience.
    MultipleAudiences,

    /// The `aud` claim is an empty sequence.
    EmptyAudience,

    /// The `aud` claim is neither a string nor a sequence of strings.
    InvalidAudience,

    /// The token is expired.
    Expired,

    /// The `exp` claim is not a valid epoch timestamp.
    InvalidExpiration,

    /// The token is not valid yet.
    NotBefore,

    /// The `nbf` claim is not a valid epoch timestamp.
    InvalidNotBefore,

    /// The token claims to have been issued in the future.
    IssuedAt,

    /// The `iat` claim is not a valid epoch timestamp.
    InvalidIssuedAt,
}

impl ValidateClaimsResult {
    /// Whether validation passed.
    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }
}

impl fmt::Display for ValidateClaimsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Self::Success => "success",
            Self::MismatchedIssuer => "mismatched issuer",
            Self::MismatchedAudience => "mismatched audience",
            Self::MultipleAudiences => "multiple audiences",
            Self::EmptyAudience => "empty audience",
            Self::InvalidAudience => "invalid audience claim",
            Self::Expired => "token is expired",
            Self::InvalidExpiration => "invalid expiration claim",
            Self::NotBefore => "token is not valid yet",
            Self::InvalidNotBefore => "invalid not-before claim",
            Self::IssuedAt => "token issued in the future",
            Self::InvalidIssuedAt => "invalid issued-at claim",
        };
        f.write_str(description)
    }
}

/// Validate a set of claims against the given expectations and clock.
///
/// Checks run in a fixed order: issuer, audience, expiration, not-before, issued-at. The first
/// failing check wins and the rest are skipped. An absent claim is never a failure, only a
/// skipped check, and the issuer/audience checks also require an expectation to be configured.
pub fn validate_claims(claims: &Claims, options: &ValidationOptions) -> ValidateClaimsResult {
    use ValidateClaimsResult::*;

    if let (Some(expected), Some(issuer)) = (&options.issuer, claims.get("iss")) {
        if issuer.as_str() != Some(expected.as_str()) {
            return MismatchedIssuer;
        }
    }
    if let (Some(expected), Some(audience)) = (&options.audience, claims.get("aud")) {
        let result = check_audience(audience, expected);
        if result != Success {
            return result;
        }
    }

    let now = options.current_time.timestamp_millis() as f64 / 1000.0;
    if let Some(expiration) = claims.get("exp") {
        match expiration.as_epoch_seconds() {
            Some(expires_at) if expires_at < now => return Expired,
            Some(_) => (),
            None => return InvalidExpiration,
        }
    }
    if let Some(not_before) = claims.get("nbf") {
        match not_before.as_epoch_seconds() {
            Some(valid_from) if valid_from > now => return NotBefore,
            Some(_) => (),
            None => return InvalidNotBefore,
        }
    }
    if let Some(issued_at) = claims.get("iat") {
        match issued_at.as_epoch_seconds() {
            Some(issued) if issued > now => return IssuedAt,
            Some(_) => (),
            None => return InvalidIssuedAt,
        }
    }
    Success
}

// A single element sequence is matched on its content; a longer sequence is rejected outright.
fn check_audience(audience: &ClaimValue, expected: &str) -> ValidateClaimsResult {
    use ValidateClaimsResult::*;
    match audience {
        ClaimValue::String(value) if value == expected => Success,
        ClaimValue::String(_) => MismatchedAudience,
        ClaimValue::Strings(values) => match values.as_slice() {
            [] => EmptyAudience,
            [value] if value == expected => Success,
            [_] => MismatchedAudience,
            _ => MultipleAudiences,
        },
        _ => InvalidAudience,
    }
}
