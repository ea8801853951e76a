use serde::{Deserialize, Serialize};

/// A JWT header.
///
/// Every field is optional when building a header by hand. The `alg` field is overwritten by the
/// signing step with the name of the algorithm actually used, so after any sign/encode it always
/// reflects how the token was produced, not caller intent.
///
/// The key and certificate reference fields (`jku`, `jwk`, `x5u`, `x5c`, ...) are carried
/// verbatim; nothing is ever fetched or verified against them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The token type, typically "JWT".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,

    /// The name of the algorithm used to sign this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// A URL pointing to a set of JSON-encoded public keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jku: Option<String>,

    /// The JSON web key corresponding to the key used to sign this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwk: Option<String>,

    /// The identifier of the key used to sign this token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// A URL pointing to an X.509 certificate or certificate chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5u: Option<String>,

    /// An X.509 certificate chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5c: Option<Vec<String>>,

    /// A SHA-1 thumbprint of the X.509 certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x5t: Option<String>,

    /// A SHA-256 thumbprint of the X.509 certificate.
    #[serde(rename = "x5tS256", default, skip_serializing_if = "Option::is_none")]
    pub x5t_s256: Option<String>,

    /// The content type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,

    /// The extensions that consumers of this token are required to understand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crit: Option<Vec<String>>,
}

impl Header {
    /// Construct an empty header.
    pub fn new() -> Self {
        Self::default()
    }
}
