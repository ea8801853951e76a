use crate::{
    algorithm::Algorithm,
    claims::Claims,
    codec::to_base64_json,
    header::Header,
    jwt::{sign_segments, EncodeError, Jwt},
};
use serde::Serialize;

/// A JWT shaped aggregate: a type exposing exactly a header and a claims value.
///
/// Implementing this trait is how a caller defined claims type gets woven into the compact
/// serialization without assembling segments by hand. The shape is fixed at the type level:
/// anything that is not a header plus a claims value simply cannot be encoded.
///
/// [`Jwt`] implements this trait, so an encoder handles both the generic claim map and custom
/// claims types.
pub trait TokenParts {
    /// The claims type carried by this token.
    type Claims: Serialize;

    /// The token header.
    fn header(&self) -> &Header;

    /// The token header, mutably. The encoder overwrites its `alg` field.
    fn header_mut(&mut self) -> &mut Header;

    /// The token claims.
    fn claims(&self) -> &Self::Claims;
}

impl TokenParts for Jwt {
    type Claims = Claims;

    fn header(&self) -> &Header {
        &self.header
    }

    fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    fn claims(&self) -> &Self::Claims {
        &self.claims
    }
}

/// Encodes JWT shaped aggregates into their signed compact serialization.
///
/// The signing algorithm is either fixed for all tokens or, when none is configured, resolved
/// per token from the header's key identifier through a caller supplied lookup. Resolution
/// failures are fatal for that call: a token must never come out silently unsigned or signed
/// with the wrong key.
pub struct JwtEncoder {
    signer: SignerResolution,
}

enum SignerResolution {
    Fixed(Algorithm),
    KeyId(Box<dyn Fn(&str) -> Option<Algorithm> + Send + Sync>),
}

impl JwtEncoder {
    /// Construct an encoder that signs every token with the given algorithm.
    pub fn new(algorithm: Algorithm) -> Self {
        Self { signer: SignerResolution::Fixed(algorithm) }
    }

    /// Construct an encoder that resolves the algorithm from each token's `kid` header field.
    ///
    /// A token without a `kid`, or with one the lookup does not know, fails to encode.
    pub fn with_key_id_resolver<F>(resolver: F) -> Self
    where
        F: Fn(&str) -> Option<Algorithm> + Send + Sync + 'static,
    {
        Self { signer: SignerResolution::KeyId(Box::new(resolver)) }
    }

    /// Encode the given token into its compact serialization.
    ///
    /// The resolved algorithm's name overwrites the token's `alg` header field before encoding.
    pub fn encode<T: TokenParts>(&self, token: &mut T) -> Result<String, EncodeError> {
        let algorithm = self.resolve(token.header())?;
        token.header_mut().alg = Some(algorithm.name().to_string());
        let header = to_base64_json(token.header()).map_err(EncodeError::EncodingHeader)?;
        let claims = to_base64_json(token.claims()).map_err(EncodeError::EncodingClaims)?;
        sign_segments(&header, &claims, &algorithm)
    }

    fn resolve(&self, header: &Header) -> Result<Algorithm, EncodeError> {
        match &self.signer {
            SignerResolution::Fixed(algorithm) => Ok(algorithm.clone()),
            SignerResolution::KeyId(resolver) => {
                let kid = header.kid.as_deref().ok_or(EncodeError::MissingKeyId)?;
                resolver(kid).ok_or_else(|| EncodeError::UnknownKeyId(kid.to_string()))
            }
        }
    }
}
