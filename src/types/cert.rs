use chrono::{DateTime, Utc};

use crate::crypto::PublicKey;
use crate::error::TrustRootError;
use crate::parser::parse_der_certificate;

/// An ordered sequence of DER-encoded X.509 certificates. Index 0 is the leaf; later
/// entries ascend toward (but do not necessarily include) the root.
///
/// Kept as raw DER rather than parsed certificates so that suffix comparisons
/// (`contains_parent`/`trim_parent`) are exact byte comparisons, never semantic equality
/// on a reparsed object.
pub type CertPath = Vec<Vec<u8>>;

/// A half-open time interval `[start, end)`. `end = None` means "still current".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn from_start(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// `t ∈ [start, end)`.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && self.end.is_none_or(|end| t < end)
    }
}

/// A trusted root certificate, derived from a [`CertificateAuthority`]'s own path.
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    /// DER encoding of the self-signed root certificate.
    pub root_der: Vec<u8>,
}

/// A configured Certificate Authority: its own certificate chain (rooted at a self-signed
/// certificate), an identifying URI, and the window of time during which it is trusted.
#[derive(Debug, Clone)]
pub struct CertificateAuthority {
    pub cert_path: CertPath,
    pub uri: String,
    pub valid_for: TimeWindow,
}

impl CertificateAuthority {
    pub fn new(cert_path: CertPath, uri: impl Into<String>, valid_for: TimeWindow) -> Self {
        Self {
            cert_path,
            uri: uri.into(),
            valid_for,
        }
    }

    /// Convert this CA's own path into a PKIX trust anchor. Must be called (and succeed)
    /// eagerly at verifier-construction time; see [`crate::trust::FulcioTrustRoot::new`].
    pub fn as_trust_anchor(&self) -> Result<TrustAnchor, TrustRootError> {
        let root_der = self
            .cert_path
            .last()
            .ok_or_else(|| TrustRootError::EmptyCertPath {
                uri: self.uri.clone(),
            })?;

        let root_cert = parse_der_certificate(root_der).map_err(|source| {
            TrustRootError::InvalidCertificateAuthority {
                uri: self.uri.clone(),
                source,
            }
        })?;

        let is_self_signed = root_cert.subject() == root_cert.issuer()
            && PublicKey::from_certificate(&root_cert)
                .and_then(|key| {
                    key.verify_signature(
                        root_cert.tbs_certificate.as_ref(),
                        root_cert.signature_value.data.as_ref(),
                        &root_cert.signature_algorithm,
                    )
                })
                .is_ok();

        if !is_self_signed {
            return Err(TrustRootError::NoSelfSignedRoot {
                uri: self.uri.clone(),
            });
        }

        Ok(TrustAnchor {
            root_der: root_der.clone(),
        })
    }

    /// `{ ca | t ∈ ca.valid_for }`, preserving input order.
    pub fn find(cas: &[CertificateAuthority], t: DateTime<Utc>) -> Vec<&CertificateAuthority> {
        cas.iter().filter(|ca| ca.valid_for.contains(t)).collect()
    }
}

/// A configured Certificate Transparency log: its public key, the 32-byte LogID derived
/// from that key's SubjectPublicKeyInfo, and the window during which it is trusted.
#[derive(Debug, Clone)]
pub struct TransparencyLog {
    pub public_key: PublicKey,
    pub base_url: String,
    pub log_id: [u8; 32],
    pub valid_for: TimeWindow,
}

impl TransparencyLog {
    /// `spki_der` is the DER-encoded SubjectPublicKeyInfo of the log's signing key.
    pub fn new(
        spki_der: &[u8],
        base_url: impl Into<String>,
        valid_for: TimeWindow,
    ) -> Result<Self, TrustRootError> {
        let base_url = base_url.into();
        let public_key = PublicKey::from_spki_der(spki_der).map_err(|source| {
            TrustRootError::InvalidTransparencyLog {
                base_url: base_url.clone(),
                source,
            }
        })?;
        let log_id = crate::crypto::sha256(spki_der);
        Ok(Self {
            public_key,
            base_url,
            log_id,
            valid_for,
        })
    }

    /// The *first* log with matching `log_id` and `t ∈ log.valid_for`, else `None`.
    pub fn find<'a>(
        logs: &'a [TransparencyLog],
        log_id: &[u8; 32],
        t: DateTime<Utc>,
    ) -> Option<&'a TransparencyLog> {
        logs.iter()
            .find(|log| &log.log_id == log_id && log.valid_for.contains(t))
    }
}
