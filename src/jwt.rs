use crate::{
    algorithm::{Algorithm, SigningError},
    claims::Claims,
    codec::{from_base64, to_base64, to_base64_json},
    header::Header,
    validator::{validate_claims, ValidateClaimsResult, ValidationOptions},
};

/// A JSON Web Token: a header plus a set of claims.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Jwt {
    /// The token header.
    pub header: Header,

    /// The token claims.
    pub claims: Claims,
}

impl Jwt {
    /// Construct a new token from a header and a set of claims.
    pub fn new(header: Header, claims: Claims) -> Self {
        Self { header, claims }
    }

    /// Sign this token, producing its compact serialization.
    ///
    /// The header's `alg` field is set to the algorithm's name before encoding, overwriting any
    /// previous value. Signing with [`Algorithm::None`] produces a two segment token with no
    /// signature; any other algorithm produces three segments. On failure no partial token is
    /// ever returned.
    pub fn sign(&mut self, algorithm: &Algorithm) -> Result<String, EncodeError> {
        self.header.alg = Some(algorithm.name().to_string());
        let header = to_base64_json(&self.header).map_err(EncodeError::EncodingHeader)?;
        let claims = to_base64_json(&self.claims).map_err(EncodeError::EncodingClaims)?;
        sign_segments(&header, &claims, algorithm)
    }

    /// Decode a compact serialization string into its header and claims.
    ///
    /// Valid tokens have exactly two or three dot separated segments. This performs no
    /// signature verification; see [`Jwt::verify`]. The claims always come back as the generic
    /// open map, never as a caller defined type.
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let segments: Vec<&str> = token.split('.').collect();
        let (header, claims) = match segments.as_slice() {
            [header, claims] | [header, claims, _] => (*header, *claims),
            _ => return Err(DecodeError::SegmentCount(segments.len())),
        };
        let header = from_base64(header).map_err(|e| DecodeError::Base64("header", e))?;
        let header = serde_json::from_slice(&header).map_err(|e| DecodeError::Json("header", e))?;
        let claims = from_base64(claims).map_err(|e| DecodeError::Base64("claims", e))?;
        let claims = serde_json::from_slice(&claims).map_err(|e| DecodeError::Json("claims", e))?;
        Ok(Self { header, claims })
    }

    /// Verify the signature on a compact serialization string against the given algorithm.
    ///
    /// Exactly three segments are required, so an unsigned two segment token fails against every
    /// algorithm, `none` included; accepting unsigned tokens is a policy decision the caller
    /// makes explicitly. A malformed signature segment is a verification failure, not an error.
    pub fn verify(token: &str, algorithm: &Algorithm) -> bool {
        let segments: Vec<&str> = token.split('.').collect();
        let [header, claims, signature] = segments.as_slice() else {
            return false;
        };
        let Ok(signature) = from_base64(signature) else {
            return false;
        };
        let signed_input = format!("{header}.{claims}");
        algorithm.verify(&signature, signed_input.as_bytes())
    }

    /// Validate the registered claims in this token against the given expectations.
    pub fn validate_claims(&self, options: &ValidationOptions) -> ValidateClaimsResult {
        validate_claims(&self.claims, options)
    }
}

// Assemble the final compact string from the two encoded segments and the signature.
pub(crate) fn sign_segments(header: &str, claims: &str, algorithm: &Algorithm) -> Result<String, EncodeError> {
    let signing_input = format!("{header}.{claims}");
    match algorithm {
        Algorithm::None => Ok(signing_input),
        _ => {
            let signature = algorithm.sign(signing_input.as_bytes())?;
            let signature = to_base64(&signature);
            Ok(format!("{signing_input}.{signature}"))
        }
    }
}

/// An error when producing a compact serialization string.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("encoding header: {0}")]
    EncodingHeader(serde_json::Error),

    #[error("encoding claims: {0}")]
    EncodingClaims(serde_json::Error),

    #[error("signing failed: {0}")]
    Signing(#[from] SigningError),

    #[error("no key identifier in header")]
    MissingKeyId,

    #[error("invalid key identifier: {0}")]
    UnknownKeyId(String),
}

/// An error when decoding a compact serialization string.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("expected 2 or 3 segments, found {0}")]
    SegmentCount(usize),

    #[error("invalid base64 in {0}: {1}")]
    Base64(&'static str, base64::DecodeError),

    #[error("invalid JSON in {0}: {1}")]
    Json(&'static str, serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::to_base64;
    use rstest::rstest;
    use serde_json::json;

    fn hs256() -> Algorithm {
        Algorithm::Hs256(b"secret".to_vec())
    }

    fn sample_claims() -> Claims {
        serde_json::from_value(json!({
            "iss": "issuer",
            "aud": "service",
            "sub": "user-1",
            "exp": 1740495955,
            "admin": true,
            "scopes": ["read", "write"],
        }))
        .expect("invalid claims")
    }

    #[test]
    fn round_trip() {
        let mut jwt = Jwt::new(Header { typ: Some("JWT".into()), ..Default::default() }, sample_claims());
        let token = jwt.sign(&hs256()).expect("sign failed");
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(jwt.header.alg.as_deref(), Some("HS256"));

        let decoded = Jwt::decode(&token).expect("decode failed");
        assert_eq!(decoded, jwt);
    }

    #[test]
    fn sign_overwrites_caller_alg() {
        let header = Header { alg: Some("RS256".into()), ..Default::default() };
        let mut jwt = Jwt::new(header, sample_claims());
        jwt.sign(&hs256()).expect("sign failed");
        assert_eq!(jwt.header.alg.as_deref(), Some("HS256"));
    }

    #[test]
    fn unsigned_token_has_two_segments() {
        let mut jwt = Jwt::new(Header::new(), sample_claims());
        let token = jwt.sign(&Algorithm::None).expect("sign failed");
        assert_eq!(token.split('.').count(), 2);
        assert_eq!(jwt.header.alg.as_deref(), Some("none"));

        let decoded = Jwt::decode(&token).expect("decode failed");
        assert_eq!(decoded.claims, jwt.claims);
    }

    #[test]
    fn verify_is_idempotent() {
        let token = Jwt::new(Header::new(), sample_claims()).sign(&hs256()).expect("sign failed");
        assert!(Jwt::verify(&token, &hs256()));
        assert!(Jwt::verify(&token, &hs256()));
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let token = Jwt::new(Header::new(), sample_claims()).sign(&hs256()).expect("sign failed");
        let (base, signature) = token.rsplit_once('.').unwrap();

        // Change every byte in the signature and make sure verification fails every time.
        let signature = from_base64(signature).unwrap();
        for index in 0..signature.len() {
            let mut signature = signature.clone();
            signature[index] = signature[index].wrapping_add(1);
            let token = format!("{base}.{}", to_base64(&signature));
            assert!(!Jwt::verify(&token, &hs256()));
        }
    }

    #[rstest]
    #[case::header(0)]
    #[case::claims(1)]
    fn tampered_payload_fails_verification(#[case] segment: usize) {
        let token = Jwt::new(Header::new(), sample_claims()).sign(&hs256()).expect("sign failed");
        let mut segments: Vec<String> = token.split('.').map(ToString::to_string).collect();

        // Flip one bit in the decoded segment and splice it back in.
        let mut bytes = from_base64(&segments[segment]).unwrap();
        bytes[0] ^= 1;
        segments[segment] = to_base64(&bytes);
        let tampered = segments.join(".");
        assert!(!Jwt::verify(&tampered, &hs256()));
    }

    #[rstest]
    #[case::other_hmac_family(Algorithm::Hs384(b"secret".to_vec()))]
    #[case::other_key(Algorithm::Hs256(b"other secret".to_vec()))]
    #[case::ecdsa(Algorithm::Es256k(vec![1; 32]))]
    fn algorithm_mismatch_fails_verification(#[case] other: Algorithm) {
        let token = Jwt::new(Header::new(), sample_claims()).sign(&hs256()).expect("sign failed");
        assert!(Jwt::verify(&token, &hs256()));
        assert!(!Jwt::verify(&token, &other));
    }

    #[rstest]
    #[case::one_segment("YQ")]
    #[case::four_segments("YQ.YQ.YQ.YQ")]
    #[case::empty("")]
    fn invalid_segment_counts(#[case] input: &str) {
        let err = Jwt::decode(input).expect_err("decode succeeded");
        assert!(matches!(err, DecodeError::SegmentCount(_)));
    }

    #[test]
    fn two_segments_decode_but_never_verify() {
        let mut jwt = Jwt::new(Header::new(), sample_claims());
        let token = jwt.sign(&Algorithm::None).expect("sign failed");
        Jwt::decode(&token).expect("decode failed");
        assert!(!Jwt::verify(&token, &hs256()));
        assert!(!Jwt::verify(&token, &Algorithm::None));
    }

    #[rstest]
    #[case::bad_base64("&&&.e30", "header")]
    #[case::bad_json_header("YQ.e30", "header")]
    fn malformed_header(#[case] input: &str, #[case] component: &str) {
        let err = Jwt::decode(input).expect_err("decode succeeded");
        match err {
            DecodeError::Base64(found, _) | DecodeError::Json(found, _) => assert_eq!(found, component),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_claims() {
        // Valid header segment, claims segment is not a JSON object.
        let input = format!("{}.{}", to_base64(b"{}"), to_base64(b"[1,2]"));
        let err = Jwt::decode(&input).expect_err("decode succeeded");
        assert!(matches!(err, DecodeError::Json("claims", _)));
    }

    #[test]
    fn malformed_signature_segment_fails_verification() {
        let token = Jwt::new(Header::new(), sample_claims()).sign(&hs256()).expect("sign failed");
        let (base, _) = token.rsplit_once('.').unwrap();
        assert!(!Jwt::verify(&format!("{base}.&&&"), &hs256()));
    }
}
