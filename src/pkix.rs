//! PKIX path validation (§4.3), pinned to a moment inside the leaf's own validity window rather
//! than wall-clock time: Fulcio leaves live for only minutes, so validating "now" would reject
//! perfectly good certificates moments after issuance. Revocation (CRL/OCSP) is never consulted;
//! short validity is Fulcio's control instead.

use chrono::{DateTime, TimeZone, Utc};
use x509_parser::certificate::X509Certificate;
use x509_parser::time::ASN1Time;

use crate::cert::{append, contains_parent, get_leaf, is_self_signed};
use crate::crypto::PublicKey;
use crate::error::VerificationError;
use crate::parser::parse_der_certificate;
use crate::types::{CertPath, CertificateAuthority};

fn asn1_time_to_utc(t: ASN1Time) -> DateTime<Utc> {
    Utc.timestamp_opt(t.timestamp(), 0).single().unwrap_or_default()
}

/// Build the candidate `full_cert_path` for `ca` and run chain-of-signatures + validity-window
/// checks, pinned to `at`. Returns the failure reason string on any problem (never raises —
/// callers accumulate one reason per candidate CA).
fn try_candidate(input: &CertPath, ca: &CertificateAuthority, at: DateTime<Utc>) -> Result<CertPath, String> {
    let full_cert_path = if is_self_signed(input) {
        if !contains_parent(input, &ca.cert_path) {
            return Err("Trusted root in chain does not match".to_string());
        }
        input.clone()
    } else {
        append(&ca.cert_path, input)
    };

    verify_chain(&full_cert_path, at)?;
    Ok(full_cert_path)
}

fn verify_chain(full_cert_path: &CertPath, at: DateTime<Utc>) -> Result<(), String> {
    if full_cert_path.is_empty() {
        return Err("certificate path is empty".to_string());
    }

    let parsed: Vec<X509Certificate> = full_cert_path
        .iter()
        .map(|der| parse_der_certificate(der))
        .collect::<Result<_, _>>()
        .map_err(|e| e.to_string())?;

    for cert in &parsed {
        let not_before = asn1_time_to_utc(cert.validity().not_before);
        let not_after = asn1_time_to_utc(cert.validity().not_after);
        if at < not_before || at >= not_after {
            return Err(format!(
                "certificate validity [{not_before}, {not_after}) does not contain {at}"
            ));
        }
    }

    for pair in parsed.windows(2) {
        let child = &pair[0];
        let parent = &pair[1];
        let parent_key = PublicKey::from_certificate(parent).map_err(|e| e.to_string())?;
        parent_key
            .verify_signature(
                child.tbs_certificate.as_ref(),
                child.signature_value.data.as_ref(),
                &child.signature_algorithm,
            )
            .map_err(|e| e.to_string())?;
    }

    Ok(())
}

/// Candidate CAs in PKIX validation order: `t ∈ ca.valid_for`, preserving configuration order.
pub fn validate_cert_path(
    input: &CertPath,
    cas: &[CertificateAuthority],
) -> Result<CertPath, VerificationError> {
    let leaf = get_leaf(input)?;
    let leaf_not_before = asn1_time_to_utc(leaf.validity().not_before);

    let candidates = CertificateAuthority::find(cas, leaf_not_before);
    if candidates.is_empty() {
        return Err(VerificationError::NoValidCertificateAuthorities);
    }

    let mut failures = Vec::new();
    for ca in candidates {
        match try_candidate(input, ca, leaf_not_before) {
            Ok(full_cert_path) => return Ok(full_cert_path),
            Err(reason) => failures.push((ca.uri.clone(), reason)),
        }
    }

    Err(VerificationError::cert_path_validation_failed(failures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeWindow;

    #[test]
    fn no_candidate_cas_fails_fast() {
        let input: CertPath = vec![vec![1, 2, 3]];
        let cas: Vec<CertificateAuthority> = vec![];
        let err = validate_cert_path(&input, &cas).unwrap_err();
        assert!(matches!(err, VerificationError::NoValidCertificateAuthorities)
            || matches!(err, VerificationError::Certificate(_)));
    }

    #[test]
    fn time_window_excludes_ca_regardless_of_key_validity() {
        // A CA whose window does not include any plausible leaf time is never even tried:
        // it must not appear in the candidate list, independent of whether its key would work.
        let far_future_only = CertificateAuthority::new(
            vec![vec![9]],
            "future-ca",
            TimeWindow::from_start(Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap()),
        );
        let candidates = CertificateAuthority::find(&[far_future_only], Utc::now());
        assert!(candidates.is_empty());
    }
}
