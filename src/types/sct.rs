//! RFC 6962 Signed Certificate Timestamp types and their TLS encoding.

/// `signature_type::V1` — the only SCT version currently deployed.
pub const SCT_VERSION_V1: u8 = 0;

/// RFC 5246 `HashAlgorithm::sha256`.
pub const HASH_ALGORITHM_SHA256: u8 = 4;

/// RFC 5246 `SignatureAlgorithm::ecdsa`.
pub const SIGNATURE_ALGORITHM_ECDSA: u8 = 3;

/// RFC 5246 `SignatureAlgorithm::rsa`.
pub const SIGNATURE_ALGORITHM_RSA: u8 = 1;

/// The `digitally-signed` struct from RFC 5246 §4.7, as embedded in an SCT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitallySigned {
    pub hash_algorithm: u8,
    pub signature_algorithm: u8,
    pub signature: Vec<u8>,
}

/// A single RFC 6962 §3.2 `SignedCertificateTimestamp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedCertificateTimestamp {
    pub version: u8,
    pub log_id: [u8; 32],
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub extensions: Vec<u8>,
    pub signature: DigitallySigned,
}

/// The outcome of checking every SCT embedded in a certificate against the configured
/// transparency logs: each SCT ends up in exactly one of these two lists.
#[derive(Debug, Clone, Default)]
pub struct CtVerificationResult {
    pub valid_scts: Vec<SignedCertificateTimestamp>,
    pub invalid_scts: Vec<SignedCertificateTimestamp>,
}

impl CtVerificationResult {
    pub fn total(&self) -> usize {
        self.valid_scts.len() + self.invalid_scts.len()
    }
}
