//! Trust-root model (§4.2): a `FulcioTrustRoot` is a list of Certificate Authorities and a list
//! of Certificate Transparency logs, each with a time window of validity. Every CA is converted
//! to a PKIX trust anchor eagerly at construction time — a malformed CA is a deployment bug
//! (`TrustRootError`), never something discovered lazily while verifying an end-user certificate.

use crate::error::TrustRootError;
use crate::types::{CertificateAuthority, TransparencyLog};

/// Trusted material a [`crate::FulcioVerifier`] is built from. Both lists retain their input
/// order: only semantically significant for producing deterministic error messages.
#[derive(Debug, Clone)]
pub struct FulcioTrustRoot {
    pub certificate_authorities: Vec<CertificateAuthority>,
    pub transparency_logs: Vec<TransparencyLog>,
}

impl FulcioTrustRoot {
    /// Validate every CA's `as_trust_anchor()` eagerly; fails the whole construction if any CA
    /// is malformed. CT log public keys are already validated at `TransparencyLog::new` time.
    pub fn new(
        certificate_authorities: Vec<CertificateAuthority>,
        transparency_logs: Vec<TransparencyLog>,
    ) -> Result<Self, TrustRootError> {
        for ca in &certificate_authorities {
            ca.as_trust_anchor()?;
        }

        Ok(Self {
            certificate_authorities,
            transparency_logs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeWindow;
    use chrono::Utc;

    #[test]
    fn rejects_ca_with_empty_cert_path() {
        let bad_ca = CertificateAuthority::new(vec![], "bad-ca", TimeWindow::from_start(Utc::now()));
        let result = FulcioTrustRoot::new(vec![bad_ca], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn accepts_empty_trust_root() {
        let result = FulcioTrustRoot::new(vec![], vec![]);
        assert!(result.is_ok());
    }
}
