//! Abstract cryptographic backend for DNSSEC and transaction signatures.
//!
//! The codec layer never calls into a crypto library directly; it calls
//! through the [`Crypto`] trait so callers can swap backends (or supply
//! none, in an embedding that forbids network-independent crypto) without
//! this crate pulling in a hard dependency on any one implementation.
//! [`RingCrypto`] is the default concrete backend, gated behind the
//! `dnssec-ring` feature, mirroring how `hickory-proto` isolates its
//! signing backend behind a trait rather than calling `ring` inline.

use std::fmt;

/// DNSSEC/SIG(0) public-key algorithm numbers (RFC 8624 section 3.1).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SignAlgorithm {
    RsaSha1,
    RsaSha256,
    RsaSha512,
    EcdsaP256Sha256,
    EcdsaP384Sha384,
    Ed25519,
}

/// RFC 8945 section 6 TSIG MAC algorithms.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MacAlgorithm {
    HmacMd5,
    HmacSha1,
    HmacSha256,
    HmacSha384,
    HmacSha512,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Error {
    UnsupportedAlgorithm,
    BadKey,
    VerificationFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedAlgorithm => write!(f, "crypto backend does not support this algorithm"),
            Error::BadKey => write!(f, "malformed or invalid key material"),
            Error::VerificationFailed => write!(f, "signature or MAC verification failed"),
        }
    }
}

impl std::error::Error for Error {}

/// A pluggable cryptography provider. Every method is a pure function of
/// its inputs; no method touches the filesystem, clock, or network.
pub trait Crypto {
    fn sign(&self, algorithm: SignAlgorithm, private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, Error>;

    fn verify(
        &self,
        algorithm: SignAlgorithm,
        public_key: &[u8],
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), Error>;

    /// SHA-1/SHA-256/SHA-384 digest, as used by DS digest types and
    /// NSEC3 hashing.
    fn digest_sha1(&self, message: &[u8]) -> Vec<u8>;
    fn digest_sha256(&self, message: &[u8]) -> Vec<u8>;
    fn digest_sha384(&self, message: &[u8]) -> Vec<u8>;

    /// HMAC over `message` with `key`, for TSIG/SIG(0)-adjacent shared-secret
    /// authentication (RFC 8945). Unlike `sign`/`verify`, HMAC is a
    /// backend-independent software primitive, so it's provided here via
    /// `hmac`/`md5`/`sha1`/`sha2` directly rather than deferred to a specific
    /// provider; `ring` has no MD5 support, so a `ring`-only implementation
    /// couldn't cover `hmac-md5` anyway.
    fn mac(&self, algorithm: MacAlgorithm, key: &[u8], message: &[u8]) -> Vec<u8> {
        use hmac::{Hmac, Mac};

        macro_rules! hmac_with {
            ($digest:ty) => {{
                let mut mac = Hmac::<$digest>::new_from_slice(key).expect("HMAC accepts keys of any length");
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }};
        }

        match algorithm {
            MacAlgorithm::HmacMd5 => hmac_with!(md5::Md5),
            MacAlgorithm::HmacSha1 => hmac_with!(sha1::Sha1),
            MacAlgorithm::HmacSha256 => hmac_with!(sha2::Sha256),
            MacAlgorithm::HmacSha384 => hmac_with!(sha2::Sha384),
            MacAlgorithm::HmacSha512 => hmac_with!(sha2::Sha512),
        }
    }
}

/// Equal-length, equal-content comparison that does not short-circuit on
/// the first differing byte; used to compare MACs and digests without
/// leaking timing information about where they diverge.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(feature = "dnssec-ring")]
pub use ring_backend::RingCrypto;

#[cfg(feature = "dnssec-ring")]
mod ring_backend {
    use super::{Crypto, Error, SignAlgorithm};
    use ring::digest;
    use ring::signature::{self, UnparsedPublicKey};

    /// The default [`Crypto`] backend, built on `ring`.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct RingCrypto;

    impl Crypto for RingCrypto {
        fn sign(&self, algorithm: SignAlgorithm, private_key: &[u8], message: &[u8]) -> Result<Vec<u8>, Error> {
            match algorithm {
                SignAlgorithm::Ed25519 => {
                    let pair = ring::signature::Ed25519KeyPair::from_pkcs8(private_key)
                        .or_else(|_| ring::signature::Ed25519KeyPair::from_seed_unchecked(private_key))
                        .map_err(|_| Error::BadKey)?;
                    Ok(pair.sign(message).as_ref().to_vec())
                }
                SignAlgorithm::EcdsaP256Sha256 => sign_ecdsa(&signature::ECDSA_P256_SHA256_ASN1_SIGNING, private_key, message),
                SignAlgorithm::EcdsaP384Sha384 => sign_ecdsa(&signature::ECDSA_P384_SHA384_ASN1_SIGNING, private_key, message),
                SignAlgorithm::RsaSha1 | SignAlgorithm::RsaSha256 | SignAlgorithm::RsaSha512 => {
                    sign_rsa(algorithm, private_key, message)
                }
            }
        }

        fn verify(
            &self,
            algorithm: SignAlgorithm,
            public_key: &[u8],
            message: &[u8],
            sig: &[u8],
        ) -> Result<(), Error> {
            let alg: &dyn signature::VerificationAlgorithm = match algorithm {
                SignAlgorithm::RsaSha1 => &signature::RSA_PKCS1_1024_8192_SHA1_FOR_LEGACY_USE_ONLY,
                SignAlgorithm::RsaSha256 => &signature::RSA_PKCS1_2048_8192_SHA256,
                SignAlgorithm::RsaSha512 => &signature::RSA_PKCS1_2048_8192_SHA512,
                SignAlgorithm::EcdsaP256Sha256 => &signature::ECDSA_P256_SHA256_FIXED,
                SignAlgorithm::EcdsaP384Sha384 => &signature::ECDSA_P384_SHA384_FIXED,
                SignAlgorithm::Ed25519 => &signature::ED25519,
            };
            UnparsedPublicKey::new(alg, public_key)
                .verify(message, sig)
                .map_err(|_| Error::VerificationFailed)
        }

        fn digest_sha1(&self, message: &[u8]) -> Vec<u8> {
            digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, message).as_ref().to_vec()
        }

        fn digest_sha256(&self, message: &[u8]) -> Vec<u8> {
            digest::digest(&digest::SHA256, message).as_ref().to_vec()
        }

        fn digest_sha384(&self, message: &[u8]) -> Vec<u8> {
            digest::digest(&digest::SHA384, message).as_ref().to_vec()
        }
    }

    fn sign_ecdsa(
        alg: &'static signature::EcdsaSigningAlgorithm,
        pkcs8: &[u8],
        message: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let rng = ring::rand::SystemRandom::new();
        let pair = signature::EcdsaKeyPair::from_pkcs8(alg, pkcs8, &rng).map_err(|_| Error::BadKey)?;
        pair.sign(&rng, message).map(|s| s.as_ref().to_vec()).map_err(|_| Error::BadKey)
    }

    fn sign_rsa(algorithm: SignAlgorithm, pkcs8: &[u8], message: &[u8]) -> Result<Vec<u8>, Error> {
        let padding: &dyn signature::RsaEncoding = match algorithm {
            SignAlgorithm::RsaSha1 => &signature::RSA_PKCS1_SHA1_FOR_LEGACY_USE_ONLY,
            SignAlgorithm::RsaSha256 => &signature::RSA_PKCS1_SHA256,
            SignAlgorithm::RsaSha512 => &signature::RSA_PKCS1_SHA512,
            _ => return Err(Error::UnsupportedAlgorithm),
        };
        let pair = signature::RsaKeyPair::from_pkcs8(pkcs8).map_err(|_| Error::BadKey)?;
        let rng = ring::rand::SystemRandom::new();
        let mut sig = vec![0u8; pair.public_modulus_len()];
        pair.sign(padding, &rng, message, &mut sig).map_err(|_| Error::BadKey)?;
        Ok(sig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_slice_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }

    #[cfg(feature = "dnssec-ring")]
    #[test]
    fn ring_digest_sha256_matches_known_vector() {
        let crypto = RingCrypto;
        let digest = crypto.digest_sha256(b"abc");
        assert_eq!(
            digest,
            [
                0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae, 0x22, 0x23,
                0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61, 0xf2, 0x00, 0x15, 0xad,
            ]
        );
    }
}
