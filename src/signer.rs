//! ECDSA signing primitive (§4.6). The hash algorithm is a parameter independent of the
//! signing key's curve — Fulcio-adjacent tooling picks `ECDSA-with-SHA{256,384,512}`
//! regardless of whether the key itself is P-256 or P-384 — so a digest computed with any
//! of the three hashes can be signed by either curve.

use ecdsa::signature::hazmat::PrehashSigner;
use sha2::{Digest, Sha256, Sha384, Sha512};

use crate::crypto::PublicKey;
use crate::error::VerificationError;

/// Digest algorithm used to hash an artifact before ECDSA signing, independent of the
/// signing key's curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    /// Digest length in bytes, used to validate a caller-supplied digest in `sign_digest`.
    pub fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

#[derive(Clone)]
enum SigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
}

/// ECDSA signer over a P-256 or P-384 key, producing DER-encoded `ECDSA-Sig-Value`
/// signatures. Holds a private key; callers own the lifetime. `p256`/`p384` signing keys
/// are `Send + Sync`, so no internal synchronization is needed for concurrent use.
#[derive(Clone)]
pub struct EcdsaSigner {
    signing_key: SigningKey,
    hash_algorithm: HashAlgorithm,
}

impl EcdsaSigner {
    pub fn new_p256(signing_key: p256::ecdsa::SigningKey, hash_algorithm: HashAlgorithm) -> Self {
        Self {
            signing_key: SigningKey::P256(signing_key),
            hash_algorithm,
        }
    }

    pub fn new_p384(signing_key: p384::ecdsa::SigningKey, hash_algorithm: HashAlgorithm) -> Self {
        Self {
            signing_key: SigningKey::P384(signing_key),
            hash_algorithm,
        }
    }

    /// Hash `artifact` with the configured hash algorithm, then ECDSA-sign the digest.
    pub fn sign(&self, artifact: &[u8]) -> Vec<u8> {
        let digest = self.hash_algorithm.digest(artifact);
        self.sign_prehashed(&digest)
    }

    /// ECDSA-sign `digest` directly, without hashing it first. `digest` must already be
    /// `hash_algorithm.digest_len()` bytes.
    pub fn sign_digest(&self, digest: &[u8]) -> Result<Vec<u8>, VerificationError> {
        let expected = self.hash_algorithm.digest_len();
        if digest.len() != expected {
            return Err(VerificationError::DigestLengthMismatch {
                expected,
                actual: digest.len(),
            });
        }
        Ok(self.sign_prehashed(digest))
    }

    fn sign_prehashed(&self, digest: &[u8]) -> Vec<u8> {
        match &self.signing_key {
            SigningKey::P256(key) => {
                let sig: p256::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .expect("ECDSA prehash signing over a non-empty digest does not fail");
                sig.to_der().as_bytes().to_vec()
            }
            SigningKey::P384(key) => {
                let sig: p384::ecdsa::Signature = key
                    .sign_prehash(digest)
                    .expect("ECDSA prehash signing over a non-empty digest does not fail");
                sig.to_der().as_bytes().to_vec()
            }
        }
    }

    /// The EC public key matching this signer's private key, for binding into CSRs.
    pub fn public_key(&self) -> PublicKey {
        match &self.signing_key {
            SigningKey::P256(key) => PublicKey::EcdsaP256(*key.verifying_key()),
            SigningKey::P384(key) => PublicKey::EcdsaP384(*key.verifying_key()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p256::ecdsa::SigningKey as P256SigningKey;

    fn test_signer(hash_algorithm: HashAlgorithm) -> EcdsaSigner {
        let key = P256SigningKey::from_bytes(&[9u8; 32].into()).unwrap();
        EcdsaSigner::new_p256(key, hash_algorithm)
    }

    #[test]
    fn sign_digest_rejects_wrong_length() {
        let signer = test_signer(HashAlgorithm::Sha256);
        let err = signer.sign_digest(&[0u8; 31]).unwrap_err();
        assert!(matches!(
            err,
            VerificationError::DigestLengthMismatch {
                expected: 32,
                actual: 31
            }
        ));
    }

    #[test]
    fn sign_digest_accepts_correct_length() {
        let signer = test_signer(HashAlgorithm::Sha256);
        let digest = Sha256::digest(b"artifact");
        assert!(signer.sign_digest(&digest).is_ok());
    }

    #[test]
    fn sign_output_verifies_against_public_key() {
        let signer = test_signer(HashAlgorithm::Sha256);
        let artifact = b"some artifact bytes";
        let signature_der = signer.sign(artifact);

        let PublicKey::EcdsaP256(verifying_key) = signer.public_key() else {
            panic!("expected P-256 public key");
        };
        let sig = p256::ecdsa::Signature::from_der(&signature_der).unwrap();
        let digest = Sha256::digest(artifact);
        use ecdsa::signature::hazmat::PrehashVerifier;
        verifying_key.verify_prehash(&digest, &sig).unwrap();
    }

    #[test]
    fn sign_digest_of_sha256_matches_sign() {
        let signer = test_signer(HashAlgorithm::Sha256);
        let artifact = b"identical content";
        let digest = Sha256::digest(artifact);

        let sig_via_sign = signer.sign(artifact);
        let sig_via_digest = signer.sign_digest(&digest).unwrap();

        let PublicKey::EcdsaP256(verifying_key) = signer.public_key() else {
            panic!("expected P-256 public key");
        };
        use ecdsa::signature::hazmat::PrehashVerifier;
        let sig1 = p256::ecdsa::Signature::from_der(&sig_via_sign).unwrap();
        let sig2 = p256::ecdsa::Signature::from_der(&sig_via_digest).unwrap();
        assert!(verifying_key.verify_prehash(&digest, &sig1).is_ok());
        assert!(verifying_key.verify_prehash(&digest, &sig2).is_ok());
    }

    #[test]
    fn digest_len_matches_hash_algorithm() {
        assert_eq!(HashAlgorithm::Sha256.digest_len(), 32);
        assert_eq!(HashAlgorithm::Sha384.digest_len(), 48);
        assert_eq!(HashAlgorithm::Sha512.digest_len(), 64);
    }
}
