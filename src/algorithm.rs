use hmac::{digest::KeyInit, Hmac, Mac};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use sha2::{Sha256, Sha384, Sha512};
use signature::{Signer as _, Verifier as _};
use std::fmt;

/// A JWT signing algorithm.
///
/// Each variant carries the raw key material it needs; the key is fixed at construction and the
/// value is safe to share read-only across concurrent callers. Key bytes are parsed on every
/// sign/verify call, so malformed key material surfaces as an unusable key when signing and as a
/// plain verification failure when verifying.
#[derive(Clone)]
pub enum Algorithm {
    /// The "none" algorithm: signs by producing no signature and verifies only an empty one.
    None,

    /// HMAC-SHA256 with the given shared secret.
    Hs256(Vec<u8>),

    /// HMAC-SHA384 with the given shared secret.
    Hs384(Vec<u8>),

    /// HMAC-SHA512 with the given shared secret.
    Hs512(Vec<u8>),

    /// ECDSA over secp256k1 with the given raw 32 byte secret scalar.
    ///
    /// Signs and verifies; the verifying key is derived from the secret.
    Es256k(Vec<u8>),

    /// ECDSA over secp256k1 with the given SEC1 encoded public key.
    ///
    /// Verifies only; attempting to sign is an unusable key error.
    Es256kPublic(Vec<u8>),
}

impl Algorithm {
    /// The canonical name of this algorithm, used to populate the header's `alg` field.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::None => "none",
            Algorithm::Hs256(_) => "HS256",
            Algorithm::Hs384(_) => "HS384",
            Algorithm::Hs512(_) => "HS512",
            Algorithm::Es256k(_) | Algorithm::Es256kPublic(_) => "ES256K",
        }
    }

    /// Sign the given input, returning the raw signature bytes.
    pub fn sign(&self, input: &[u8]) -> Result<Vec<u8>, SigningError> {
        match self {
            Algorithm::None => Ok(Vec::new()),
            Algorithm::Hs256(key) => hmac_sign::<Hmac<Sha256>>(key, input),
            Algorithm::Hs384(key) => hmac_sign::<Hmac<Sha384>>(key, input),
            Algorithm::Hs512(key) => hmac_sign::<Hmac<Sha512>>(key, input),
            Algorithm::Es256k(key) => {
                let key = SigningKey::from_slice(key).map_err(|_| SigningError::UnusableKey)?;
                let signature: Signature =
                    key.try_sign(input).map_err(|e| SigningError::SigningFailed(e.to_string()))?;
                Ok(signature.to_bytes().to_vec())
            }
            Algorithm::Es256kPublic(_) => Err(SigningError::UnusableKey),
        }
    }

    /// Verify a signature over the given input.
    ///
    /// This never fails with an error: a malformed key or signature is a verification failure
    /// like any other.
    pub fn verify(&self, signature: &[u8], input: &[u8]) -> bool {
        match self {
            Algorithm::None => signature.is_empty(),
            Algorithm::Hs256(key) => hmac_verify::<Hmac<Sha256>>(key, signature, input),
            Algorithm::Hs384(key) => hmac_verify::<Hmac<Sha384>>(key, signature, input),
            Algorithm::Hs512(key) => hmac_verify::<Hmac<Sha512>>(key, signature, input),
            Algorithm::Es256k(key) => {
                let Ok(key) = SigningKey::from_slice(key) else {
                    return false;
                };
                ecdsa_verify(key.verifying_key(), signature, input)
            }
            Algorithm::Es256kPublic(key) => {
                let Ok(key) = VerifyingKey::from_sec1_bytes(key) else {
                    return false;
                };
                ecdsa_verify(&key, signature, input)
            }
        }
    }
}

// Keep key material out of debug output.
impl fmt::Debug for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Algorithm({})", self.name())
    }
}

fn hmac_sign<M: Mac + KeyInit>(key: &[u8], input: &[u8]) -> Result<Vec<u8>, SigningError> {
    let mut mac = <M as KeyInit>::new_from_slice(key).map_err(|_| SigningError::UnusableKey)?;
    mac.update(input);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_verify<M: Mac + KeyInit>(key: &[u8], signature: &[u8], input: &[u8]) -> bool {
    let Ok(mut mac) = <M as KeyInit>::new_from_slice(key) else {
        return false;
    };
    mac.update(input);
    mac.verify_slice(signature).is_ok()
}

fn ecdsa_verify(key: &VerifyingKey, signature: &[u8], input: &[u8]) -> bool {
    let Ok(signature) = Signature::try_from(signature) else {
        return false;
    };
    key.verify(input, &signature).is_ok()
}

/// An error that can occur when signing.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("unusable signing key")]
    UnusableKey,

    #[error("signing failed: {0}")]
    SigningFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn hs256() -> Algorithm {
        Algorithm::Hs256(b"secret".to_vec())
    }

    #[rstest]
    #[case::none(Algorithm::None, "none")]
    #[case::hs256(hs256(), "HS256")]
    #[case::hs384(Algorithm::Hs384(vec![1]), "HS384")]
    #[case::hs512(Algorithm::Hs512(vec![1]), "HS512")]
    #[case::es256k(Algorithm::Es256k(vec![1; 32]), "ES256K")]
    #[case::es256k_public(Algorithm::Es256kPublic(vec![1; 33]), "ES256K")]
    fn canonical_names(#[case] algorithm: Algorithm, #[case] expected: &str) {
        assert_eq!(algorithm.name(), expected);
    }

    #[rstest]
    #[case::hs256(hs256())]
    #[case::hs384(Algorithm::Hs384(b"secret".to_vec()))]
    #[case::hs512(Algorithm::Hs512(b"secret".to_vec()))]
    fn hmac_sign_verify(#[case] algorithm: Algorithm) {
        let signature = algorithm.sign(b"input").expect("sign failed");
        assert!(algorithm.verify(&signature, b"input"));
        assert!(!algorithm.verify(&signature, b"other input"));
        assert!(!algorithm.verify(&signature[1..], b"input"));
    }

    #[test]
    fn hmac_wrong_key() {
        let signature = hs256().sign(b"input").expect("sign failed");
        let other = Algorithm::Hs256(b"other secret".to_vec());
        assert!(!other.verify(&signature, b"input"));
    }

    #[test]
    fn none_accepts_only_empty_signature() {
        let signature = Algorithm::None.sign(b"input").expect("sign failed");
        assert!(signature.is_empty());
        assert!(Algorithm::None.verify(&[], b"input"));
        assert!(!Algorithm::None.verify(&[0], b"input"));
    }

    #[test]
    fn es256k_sign_verify() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let algorithm = Algorithm::Es256k(key.to_bytes().to_vec());

        let signature = algorithm.sign(b"input").expect("sign failed");
        assert!(algorithm.verify(&signature, b"input"));
        assert!(!algorithm.verify(&signature, b"other input"));

        // The public half verifies the same signature but cannot sign.
        let public = Algorithm::Es256kPublic(key.verifying_key().to_sec1_bytes().to_vec());
        assert!(public.verify(&signature, b"input"));
        assert!(matches!(public.sign(b"input"), Err(SigningError::UnusableKey)));
    }

    #[test]
    fn es256k_malformed_keys() {
        let malformed = Algorithm::Es256k(vec![0; 3]);
        assert!(matches!(malformed.sign(b"input"), Err(SigningError::UnusableKey)));
        assert!(!malformed.verify(&[0; 64], b"input"));

        let malformed_public = Algorithm::Es256kPublic(vec![0; 3]);
        assert!(!malformed_public.verify(&[0; 64], b"input"));
    }

    #[test]
    fn es256k_malformed_signature() {
        let key = SigningKey::random(&mut rand::thread_rng());
        let algorithm = Algorithm::Es256k(key.to_bytes().to_vec());
        assert!(!algorithm.verify(&[], b"input"));
        assert!(!algorithm.verify(&[1, 2, 3], b"input"));
    }
}
