//! Public-key parsing and signature verification for the three algorithms Fulcio and the
//! CT logs it talks to actually use: ECDSA on P-256/P-384, and RSA (PKCS#1 v1.5).

use ecdsa::signature::hazmat::PrehashVerifier;
use ecdsa::signature::Verifier;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs1v15::{Signature as RsaSignature, VerifyingKey as RsaVerifyingKey};
use rsa::RsaPublicKey;
use sha2::{Digest, Sha256, Sha384, Sha512};
use x509_parser::certificate::X509Certificate;
use x509_parser::x509::AlgorithmIdentifier;

use crate::error::CertificateError;

const OID_EC_PUBLIC_KEY: &str = "1.2.840.10045.2.1";
const OID_EC_P256: &str = "1.2.840.10045.3.1.7";
const OID_EC_P384: &str = "1.3.132.0.34";
const OID_RSA_ENCRYPTION: &str = "1.2.840.113549.1.1.1";

const OID_ECDSA_WITH_SHA256: &str = "1.2.840.10045.4.3.2";
const OID_ECDSA_WITH_SHA384: &str = "1.2.840.10045.4.3.3";
const OID_ECDSA_WITH_SHA512: &str = "1.2.840.10045.4.3.4";
const OID_SHA256_WITH_RSA: &str = "1.2.840.113549.1.1.11";
const OID_SHA384_WITH_RSA: &str = "1.2.840.113549.1.1.12";
const OID_SHA512_WITH_RSA: &str = "1.2.840.113549.1.1.13";
const OID_SHA1_WITH_RSA: &str = "1.2.840.113549.1.1.5";

/// A parsed SubjectPublicKeyInfo, narrowed to the key types this crate can verify with.
#[derive(Debug, Clone)]
pub enum PublicKey {
    EcdsaP256(p256::ecdsa::VerifyingKey),
    EcdsaP384(p384::ecdsa::VerifyingKey),
    Rsa(RsaPublicKey),
}

pub(crate) enum HashAlg {
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    /// Map an RFC 5246 `HashAlgorithm` octet (as carried in an SCT's `DigitallySigned`).
    pub(crate) fn from_tls_octet(octet: u8) -> Option<Self> {
        match octet {
            4 => Some(HashAlg::Sha256),
            5 => Some(HashAlg::Sha384),
            6 => Some(HashAlg::Sha512),
            _ => None,
        }
    }
}

impl HashAlg {
    fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlg::Sha256 => Sha256::digest(data).to_vec(),
            HashAlg::Sha384 => Sha384::digest(data).to_vec(),
            HashAlg::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

/// Map an RFC 5246 `HashAlgorithm` octet, as carried in an SCT's `DigitallySigned` structure,
/// to the digest this crate can compute. Returns `None` for anything but SHA-256/384/512.
pub(crate) fn hash_alg_for_tls_octet(octet: u8) -> Option<HashAlg> {
    HashAlg::from_tls_octet(octet)
}

fn hash_alg_for_signature_oid(oid: &str) -> Result<HashAlg, CertificateError> {
    match oid {
        OID_ECDSA_WITH_SHA256 | OID_SHA256_WITH_RSA => Ok(HashAlg::Sha256),
        OID_ECDSA_WITH_SHA384 | OID_SHA384_WITH_RSA => Ok(HashAlg::Sha384),
        OID_ECDSA_WITH_SHA512 | OID_SHA512_WITH_RSA => Ok(HashAlg::Sha512),
        OID_SHA1_WITH_RSA => Err(CertificateError::UnsupportedSignatureAlgorithm(
            "SHA-1 signatures are not accepted".to_string(),
        )),
        other => Err(CertificateError::UnsupportedSignatureAlgorithm(
            other.to_string(),
        )),
    }
}

impl PublicKey {
    /// Extract the subject's public key from a parsed certificate. Callers pass the
    /// certificate whose key will be used to verify some *other* certificate's signature
    /// (i.e. the issuer).
    pub fn from_certificate(cert: &X509Certificate) -> Result<Self, CertificateError> {
        let spki = cert.public_key();
        let algorithm_oid = spki.algorithm.algorithm.to_string();
        let key_bytes = spki.subject_public_key.data.as_ref();

        match algorithm_oid.as_str() {
            OID_EC_PUBLIC_KEY => {
                let curve_oid = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .and_then(|p| p.as_oid().ok())
                    .map(|oid| oid.to_string())
                    .ok_or_else(|| {
                        CertificateError::UnsupportedKeyAlgorithm(
                            "EC public key is missing its curve parameter".to_string(),
                        )
                    })?;

                match curve_oid.as_str() {
                    OID_EC_P256 => {
                        let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                            .map_err(|e| CertificateError::Parse(e.to_string()))?;
                        Ok(PublicKey::EcdsaP256(key))
                    }
                    OID_EC_P384 => {
                        let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                            .map_err(|e| CertificateError::Parse(e.to_string()))?;
                        Ok(PublicKey::EcdsaP384(key))
                    }
                    other => Err(CertificateError::UnsupportedKeyAlgorithm(format!(
                        "unsupported EC curve {other}"
                    ))),
                }
            }
            OID_RSA_ENCRYPTION => {
                let key = RsaPublicKey::from_pkcs1_der(key_bytes)
                    .map_err(|e| CertificateError::Parse(e.to_string()))?;
                Ok(PublicKey::Rsa(key))
            }
            other => Err(CertificateError::UnsupportedKeyAlgorithm(other.to_string())),
        }
    }

    /// Parse a bare DER-encoded SubjectPublicKeyInfo, as used for CT log keys.
    pub fn from_spki_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (_, spki) = x509_parser::x509::SubjectPublicKeyInfo::from_der(der)
            .map_err(|e| CertificateError::Parse(e.to_string()))?;
        let algorithm_oid = spki.algorithm.algorithm.to_string();
        let key_bytes = spki.subject_public_key.data.as_ref();

        match algorithm_oid.as_str() {
            OID_EC_PUBLIC_KEY => {
                let curve_oid = spki
                    .algorithm
                    .parameters
                    .as_ref()
                    .and_then(|p| p.as_oid().ok())
                    .map(|oid| oid.to_string())
                    .ok_or_else(|| {
                        CertificateError::UnsupportedKeyAlgorithm(
                            "EC public key is missing its curve parameter".to_string(),
                        )
                    })?;
                match curve_oid.as_str() {
                    OID_EC_P256 => {
                        let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                            .map_err(|e| CertificateError::Parse(e.to_string()))?;
                        Ok(PublicKey::EcdsaP256(key))
                    }
                    OID_EC_P384 => {
                        let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(key_bytes)
                            .map_err(|e| CertificateError::Parse(e.to_string()))?;
                        Ok(PublicKey::EcdsaP384(key))
                    }
                    other => Err(CertificateError::UnsupportedKeyAlgorithm(format!(
                        "unsupported EC curve {other}"
                    ))),
                }
            }
            OID_RSA_ENCRYPTION => {
                let key = RsaPublicKey::from_pkcs1_der(key_bytes)
                    .map_err(|e| CertificateError::Parse(e.to_string()))?;
                Ok(PublicKey::Rsa(key))
            }
            other => Err(CertificateError::UnsupportedKeyAlgorithm(other.to_string())),
        }
    }

    /// Verify `signature` (algorithm-specific encoding: DER `ECDSA-Sig-Value` for ECDSA,
    /// raw PKCS#1 v1.5 for RSA) over `message`, under the hash named by `sig_alg`.
    pub fn verify_signature(
        &self,
        message: &[u8],
        signature: &[u8],
        sig_alg: &AlgorithmIdentifier,
    ) -> Result<(), CertificateError> {
        let hash_alg = hash_alg_for_signature_oid(&sig_alg.algorithm.to_string())?;
        self.verify_signature_with_hash(message, signature, hash_alg)
    }

    /// Same as [`Self::verify_signature`] but with the hash algorithm given directly rather
    /// than derived from an X.509 `AlgorithmIdentifier` — used for RFC 6962 SCT signatures,
    /// which carry their own hash-algorithm octet instead of an ASN.1 OID.
    pub(crate) fn verify_signature_with_hash(
        &self,
        message: &[u8],
        signature: &[u8],
        hash_alg: HashAlg,
    ) -> Result<(), CertificateError> {
        match self {
            PublicKey::EcdsaP256(key) => {
                let sig = p256::ecdsa::Signature::from_der(signature)
                    .map_err(|e| CertificateError::SignatureVerification(e.to_string()))?;
                let digest = hash_alg.digest(message);
                key.verify_prehash(&digest, &sig)
                    .map_err(|e| CertificateError::SignatureVerification(e.to_string()))
            }
            PublicKey::EcdsaP384(key) => {
                let sig = p384::ecdsa::Signature::from_der(signature)
                    .map_err(|e| CertificateError::SignatureVerification(e.to_string()))?;
                let digest = hash_alg.digest(message);
                key.verify_prehash(&digest, &sig)
                    .map_err(|e| CertificateError::SignatureVerification(e.to_string()))
            }
            PublicKey::Rsa(key) => {
                let sig = RsaSignature::try_from(signature)
                    .map_err(|e| CertificateError::SignatureVerification(e.to_string()))?;
                match hash_alg {
                    HashAlg::Sha256 => RsaVerifyingKey::<Sha256>::new(key.clone())
                        .verify(message, &sig)
                        .map_err(|e| CertificateError::SignatureVerification(e.to_string())),
                    HashAlg::Sha384 => RsaVerifyingKey::<Sha384>::new(key.clone())
                        .verify(message, &sig)
                        .map_err(|e| CertificateError::SignatureVerification(e.to_string())),
                    HashAlg::Sha512 => RsaVerifyingKey::<Sha512>::new(key.clone())
                        .verify(message, &sig)
                        .map_err(|e| CertificateError::SignatureVerification(e.to_string())),
                }
            }
        }
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        PublicKey::EcdsaP256(*p256::ecdsa::SigningKey::from_bytes(&[7u8; 32].into())
            .unwrap()
            .verifying_key())
    }
}
