use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The set of claims carried in a JWT payload.
///
/// This is an open map from claim name to value. The registered names (`iss`, `aud`, `azp`,
/// `at_hash`, `exp`, `nbf`, `iat`) have typed accessors and validation semantics; every other
/// name passes through opaquely.
///
/// The map is ordered by claim name so that a given claim set always serializes to the same
/// JSON, which in turn keeps the compact serialization deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(BTreeMap<String, ClaimValue>);

impl Claims {
    /// Construct an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a claim, replacing any previous value under the same name.
    pub fn insert<N, V>(&mut self, name: N, value: V)
    where
        N: Into<String>,
        V: Into<ClaimValue>,
    {
        self.0.insert(name.into(), value.into());
    }

    /// Get a claim by name.
    pub fn get(&self, name: &str) -> Option<&ClaimValue> {
        self.0.get(name)
    }

    /// Remove a claim by name, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<ClaimValue> {
        self.0.remove(name)
    }

    /// Whether a claim with the given name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// The number of claims in this set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this claim set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over all claims, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ClaimValue)> {
        self.0.iter()
    }

    /// The `iss` claim, if present and a string.
    pub fn issuer(&self) -> Option<&str> {
        self.string_claim("iss")
    }

    /// The raw `aud` claim, which may be a single string or a sequence of strings.
    pub fn audience(&self) -> Option<&ClaimValue> {
        self.get("aud")
    }

    /// The `azp` claim, if present and a string.
    pub fn authorized_party(&self) -> Option<&str> {
        self.string_claim("azp")
    }

    /// The `at_hash` claim, if present and a string.
    pub fn access_token_hash(&self) -> Option<&str> {
        self.string_claim("at_hash")
    }

    /// The `exp` claim, if present and a valid epoch timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.time_claim("exp")
    }

    /// The `nbf` claim, if present and a valid epoch timestamp.
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.time_claim("nbf")
    }

    /// The `iat` claim, if present and a valid epoch timestamp.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.time_claim("iat")
    }

    fn string_claim(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    fn time_claim(&self, name: &str) -> Option<DateTime<Utc>> {
        let seconds = self.get(name)?.as_epoch_seconds()?;
        DateTime::from_timestamp_millis((seconds * 1000.0) as i64)
    }
}

impl FromIterator<(String, ClaimValue)> for Claims {
    fn from_iter<I: IntoIterator<Item = (String, ClaimValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A single claim value.
///
/// Registered claims only ever use the string, number, and string sequence shapes; anything else
/// found in a payload is carried through opaquely in the [`Other`][ClaimValue::Other] variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    /// A string.
    String(String),

    /// A boolean.
    Bool(bool),

    /// A sequence of strings.
    Strings(Vec<String>),

    /// A number, either integer or floating point.
    Number(serde_json::Number),

    /// Any other JSON value.
    Other(serde_json::Value),
}

impl ClaimValue {
    /// Get this value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Interpret this value as an epoch timestamp in seconds.
    ///
    /// Both numbers and numeric strings are accepted; non finite values are rejected.
    pub fn as_epoch_seconds(&self) -> Option<f64> {
        let seconds = match self {
            ClaimValue::Number(number) => number.as_f64()?,
            ClaimValue::String(value) => value.parse().ok()?,
            _ => return None,
        };
        seconds.is_finite().then_some(seconds)
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for ClaimValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<serde_json::Number> for ClaimValue {
    fn from(value: serde_json::Number) -> Self {
        Self::Number(value)
    }
}

impl From<Vec<String>> for ClaimValue {
    fn from(value: Vec<String>) -> Self {
        Self::Strings(value)
    }
}

impl From<&[&str]> for ClaimValue {
    fn from(value: &[&str]) -> Self {
        Self::Strings(value.iter().map(ToString::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ClaimValue {
    fn from(value: [&str; N]) -> Self {
        Self::from(value.as_slice())
    }
}
