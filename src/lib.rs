//! A Fulcio signing-certificate verifier (§1): proves that a leaf X.509 certificate chains
//! to a configured, time-windowed Certificate Authority and carries at least one embedded
//! Signed Certificate Timestamp valid against a configured, time-windowed Certificate
//! Transparency log.
//!
//! [`FulcioVerifier`] is the entry point: built once from a [`trust::FulcioTrustRoot`],
//! reused across any number of concurrent [`FulcioVerifier::verify_signing_certificate`]
//! calls. [`signer::EcdsaSigner`] is the companion signing primitive (§4.6), unrelated to
//! verification but defining the same wire-level ECDSA signature format Fulcio-issued keys
//! are used to produce.

pub mod cert;
pub mod crypto;
pub mod ct;
pub mod error;
pub mod parser;
pub mod pkix;
pub mod signer;
pub mod trust;
pub mod types;

use error::VerificationError;
use trust::FulcioTrustRoot;
use types::{CertPath, CtVerificationResult};

pub use signer::{EcdsaSigner, HashAlgorithm};
pub use types::{CertificateAuthority, TimeWindow, TransparencyLog, TrustAnchor};

/// Default "at least one valid SCT" quorum (§4.6a). Exposed as a parameter rather than
/// hardcoded, per the design note in §9.
pub const DEFAULT_SCT_QUORUM: usize = 1;

/// Verifies Fulcio signing certificates against a configured trust root.
///
/// Immutable once constructed: every field is an owned `Vec` of value types, so
/// `&FulcioVerifier` is `Sync` and `verify_signing_certificate` may be called concurrently
/// from any number of threads on the same instance (§5). Construction validates every
/// configured CA's trust anchor eagerly (see [`trust::FulcioTrustRoot::new`]) so a
/// malformed trust root is rejected at startup rather than surfacing as a confusing
/// verify-time failure.
#[derive(Debug, Clone)]
pub struct FulcioVerifier {
    trust_root: FulcioTrustRoot,
    sct_quorum: usize,
}

impl FulcioVerifier {
    /// Build a verifier from a trust root, defaulting `sct_quorum` to
    /// [`DEFAULT_SCT_QUORUM`]. The trust root's own construction already validated every
    /// CA's trust anchor and every CT log's public key; this constructor cannot itself fail.
    pub fn new(trust_root: FulcioTrustRoot) -> Self {
        Self {
            trust_root,
            sct_quorum: DEFAULT_SCT_QUORUM,
        }
    }

    /// Override the minimum number of SCTs that must pass both the cryptographic check and
    /// the log-validity-window check (§4.6a). Default is [`DEFAULT_SCT_QUORUM`].
    pub fn with_sct_quorum(mut self, sct_quorum: usize) -> Self {
        self.sct_quorum = sct_quorum;
        self
    }

    pub fn trust_root(&self) -> &FulcioTrustRoot {
        &self.trust_root
    }

    /// §4.5: `validate_cert_path(input) ⇒ full_cert_path; verify_sct(full_cert_path)`.
    ///
    /// Returns the partitioned SCT verification result on success (callers interested only
    /// in pass/fail can discard it); any failure in either step short-circuits with a single
    /// [`VerificationError`].
    pub fn verify_signing_certificate(
        &self,
        signing_certificate: &CertPath,
    ) -> Result<CtVerificationResult, VerificationError> {
        let full_cert_path = pkix::validate_cert_path(
            signing_certificate,
            &self.trust_root.certificate_authorities,
        )?;
        ct::verify_sct(
            &full_cert_path,
            &self.trust_root.transparency_logs,
            self.sct_quorum,
        )
    }

    /// §4.5 helper: for each configured CA, if `input` has that CA's `cert_path` as a
    /// suffix, return `input` with that suffix trimmed off. Used by callers that receive a
    /// full chain from a signing service but only want the leaf-ward portion for storage.
    pub fn trim_trusted_parent(&self, input: &CertPath) -> Result<CertPath, VerificationError> {
        for ca in &self.trust_root.certificate_authorities {
            if cert::contains_parent(input, &ca.cert_path) {
                return Ok(cert::trim_parent(input, &ca.cert_path));
            }
        }
        Err(VerificationError::DoesNotChainToTrustedRoots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_trusted_parent_fails_when_no_ca_matches() {
        let trust_root = FulcioTrustRoot::new(vec![], vec![]).unwrap();
        let verifier = FulcioVerifier::new(trust_root);
        let input: CertPath = vec![vec![1], vec![2]];
        let err = verifier.trim_trusted_parent(&input).unwrap_err();
        assert!(matches!(err, VerificationError::DoesNotChainToTrustedRoots));
    }

    #[test]
    fn verify_signing_certificate_fails_fast_with_no_cas() {
        let trust_root = FulcioTrustRoot::new(vec![], vec![]).unwrap();
        let verifier = FulcioVerifier::new(trust_root);
        let input: CertPath = vec![vec![1, 2, 3]];
        let err = verifier.verify_signing_certificate(&input).unwrap_err();
        assert!(matches!(
            err,
            VerificationError::NoValidCertificateAuthorities | VerificationError::Certificate(_)
        ));
    }

    #[test]
    fn with_sct_quorum_overrides_default() {
        let trust_root = FulcioTrustRoot::new(vec![], vec![]).unwrap();
        let verifier = FulcioVerifier::new(trust_root).with_sct_quorum(2);
        assert_eq!(verifier.sct_quorum, 2);
    }
}
