use thiserror::Error;

/// Everything that can go wrong while parsing or cryptographically checking a single
/// certificate, independent of whatever larger operation (chain validation, SCT
/// verification) triggered the check.
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("failed to parse certificate: {0}")]
    Parse(String),

    #[error("unsupported public key algorithm: {0}")]
    UnsupportedKeyAlgorithm(String),

    #[error("unsupported signature algorithm: {0}")]
    UnsupportedSignatureAlgorithm(String),

    #[error("signature verification failed: {0}")]
    SignatureVerification(String),

    #[error("failed to re-encode TBS certificate: {0}")]
    TbsEncoding(String),
}

/// Construction-time-only failures: the trust root handed to [`crate::FulcioVerifier::new`]
/// is itself malformed. These can never arise from verifying a particular certificate, and
/// are deliberately a distinct type from [`VerificationError`] so a caller cannot mistake a
/// bad deployment configuration for an invalid signing certificate.
#[derive(Debug, Error)]
pub enum TrustRootError {
    #[error("certificate authority '{uri}' has no self-signed root in its certificate path")]
    NoSelfSignedRoot { uri: String },

    #[error("certificate authority '{uri}' is malformed: {source}")]
    InvalidCertificateAuthority {
        uri: String,
        #[source]
        source: CertificateError,
    },

    #[error("certificate authority '{uri}' has an empty certificate path")]
    EmptyCertPath { uri: String },

    #[error("transparency log '{base_url}' has an invalid public key: {source}")]
    InvalidTransparencyLog {
        base_url: String,
        #[source]
        source: CertificateError,
    },
}

/// The single error kind returned by [`crate::FulcioVerifier::verify_signing_certificate`]
/// and its constituent steps. Every variant's `Display` impl is the stable message string
/// relied on by conformance tests; do not reword them.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("No valid Certificate Authorities found when validating certificate")]
    NoValidCertificateAuthorities,

    #[error("Certificate was not verifiable against CAs\n{message}")]
    CertPathValidationFailed {
        failures: Vec<(String, String)>,
        message: String,
    },

    #[error("No ct logs were provided to verifier")]
    NoCtLogsConfigured,

    #[error("No valid SCTs were found during verification")]
    NoEmbeddedScts,

    #[error("No valid SCTs were found, all({total}) SCTs were invalid")]
    AllSctsInvalid { total: usize },

    #[error("Certificate does not chain to trusted roots")]
    DoesNotChainToTrustedRoots,

    #[error("certificate path is empty")]
    EmptyCertPath,

    #[error("Artifact digest must be {expected} bytes, got {actual}")]
    DigestLengthMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Certificate(#[from] CertificateError),
}

impl VerificationError {
    /// Build the "tried every CA, none worked" error from an ordered list of
    /// `(ca.uri, failure reason)` pairs, preserving trial order in both the
    /// structured data and the rendered message.
    pub fn cert_path_validation_failed(failures: Vec<(String, String)>) -> Self {
        let message = failures
            .iter()
            .map(|(uri, reason)| format!("{uri}: {reason}"))
            .collect::<Vec<_>>()
            .join("\n");
        VerificationError::CertPathValidationFailed { failures, message }
    }
}
