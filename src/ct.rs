//! Certificate Transparency SCT verification (§4.4): parses the embedded SCT list, reconstructs
//! the RFC 6962 pre-certificate TBS each SCT was actually signed over, and checks each SCT's
//! signature against the configured logs, then gates by each log's own validity window.

use chrono::{DateTime, TimeZone, Utc};
use sha2::{Digest, Sha256};
use x509_parser::certificate::X509Certificate;

use crate::cert::{get_embedded_scts, OID_EMBEDDED_SCT_LIST};
use crate::crypto::{sha256, PublicKey};
use crate::error::VerificationError;
use crate::parser::parse_der_certificate;
use crate::types::sct::{
    CtVerificationResult, DigitallySigned, SignedCertificateTimestamp, HASH_ALGORITHM_SHA256,
    SCT_VERSION_V1,
};
use crate::types::{CertPath, TransparencyLog};

const SIGNATURE_TYPE_CERTIFICATE_TIMESTAMP: u8 = 0;
const LOG_ENTRY_TYPE_PRECERT: u16 = 1;

/// Parse the TLS `SignedCertificateTimestampList` structure (RFC 6962 §3.3): a u16-length
/// prefixed vector of u16-length-prefixed serialized SCTs.
fn decode_sct_list(bytes: &[u8]) -> Result<Vec<SignedCertificateTimestamp>, String> {
    if bytes.len() < 2 {
        return Err("SCT list too short".to_string());
    }
    let total_len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    let body = bytes
        .get(2..2 + total_len)
        .ok_or_else(|| "SCT list length prefix exceeds available bytes".to_string())?;

    let mut scts = Vec::new();
    let mut offset = 0;
    while offset < body.len() {
        if offset + 2 > body.len() {
            return Err("truncated SCT entry length".to_string());
        }
        let sct_len = u16::from_be_bytes([body[offset], body[offset + 1]]) as usize;
        offset += 2;
        let sct_bytes = body
            .get(offset..offset + sct_len)
            .ok_or_else(|| "truncated SCT entry".to_string())?;
        scts.push(decode_single_sct(sct_bytes)?);
        offset += sct_len;
    }
    Ok(scts)
}

/// Parse a single serialized `SignedCertificateTimestamp` (RFC 6962 §3.2).
fn decode_single_sct(bytes: &[u8]) -> Result<SignedCertificateTimestamp, String> {
    if bytes.len() < 1 + 32 + 8 + 2 {
        return Err("SCT too short".to_string());
    }
    let version = bytes[0];
    let mut log_id = [0u8; 32];
    log_id.copy_from_slice(&bytes[1..33]);
    let timestamp = u64::from_be_bytes(bytes[33..41].try_into().unwrap());

    let ext_len = u16::from_be_bytes([bytes[41], bytes[42]]) as usize;
    let ext_start = 43;
    let ext_end = ext_start + ext_len;
    let extensions = bytes
        .get(ext_start..ext_end)
        .ok_or_else(|| "truncated SCT extensions".to_string())?
        .to_vec();

    let sig_start = ext_end;
    if bytes.len() < sig_start + 4 {
        return Err("truncated SCT signature header".to_string());
    }
    let hash_algorithm = bytes[sig_start];
    let signature_algorithm = bytes[sig_start + 1];
    let sig_len = u16::from_be_bytes([bytes[sig_start + 2], bytes[sig_start + 3]]) as usize;
    let sig_data_start = sig_start + 4;
    let signature = bytes
        .get(sig_data_start..sig_data_start + sig_len)
        .ok_or_else(|| "truncated SCT signature".to_string())?
        .to_vec();

    Ok(SignedCertificateTimestamp {
        version,
        log_id,
        timestamp,
        extensions,
        signature: DigitallySigned {
            hash_algorithm,
            signature_algorithm,
            signature,
        },
    })
}

/// Strip the embedded-SCT extension out of `leaf`'s TBS body and re-encode it, per RFC 6962's
/// pre-certificate construction.
fn precert_tbs_der(leaf_der: &[u8]) -> Result<Vec<u8>, String> {
    use der::{Decode, Encode};
    use x509_cert::Certificate;

    let mut tbs = Certificate::from_der(leaf_der)
        .map_err(|e| e.to_string())?
        .tbs_certificate;

    if let Some(extensions) = tbs.extensions.take() {
        let filtered: Vec<_> = extensions
            .into_iter()
            .filter(|ext| ext.extn_id.to_string() != OID_EMBEDDED_SCT_LIST)
            .collect();
        if !filtered.is_empty() {
            tbs.extensions = Some(filtered);
        }
    }

    tbs.to_der().map_err(|e| e.to_string())
}

/// Re-encode the issuer certificate's SubjectPublicKeyInfo to DER, for hashing into the
/// pre-cert `signed_entry`. Re-derived via `x509-cert` rather than trusting any "raw slice"
/// accessor on the parsed certificate, so the hashed bytes are exactly the DER the issuer's
/// own TBS certificate carries.
fn issuer_spki_der(issuer_der: &[u8]) -> Result<Vec<u8>, String> {
    use der::{Decode, Encode};
    use x509_cert::Certificate;

    let issuer = Certificate::from_der(issuer_der).map_err(|e| e.to_string())?;
    issuer
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| e.to_string())
}

/// RFC 6962 §3.4 `signed_entry` for a `precert_entry`: 32-byte issuer key hash followed by the
/// stripped TBS certificate as a u24-length-prefixed blob.
fn precert_signed_entry(issuer_spki_der: &[u8], stripped_tbs_der: &[u8]) -> Vec<u8> {
    let issuer_key_hash = sha256(issuer_spki_der);
    let mut out = Vec::with_capacity(32 + 3 + stripped_tbs_der.len());
    out.extend_from_slice(&issuer_key_hash);
    let len = stripped_tbs_der.len() as u32;
    out.push(((len >> 16) & 0xff) as u8);
    out.push(((len >> 8) & 0xff) as u8);
    out.push((len & 0xff) as u8);
    out.extend_from_slice(stripped_tbs_der);
    out
}

/// Build the exact byte sequence an SCT's signature is computed over (RFC 6962 §3.2), for the
/// `precert_entry` case this crate supports.
fn sct_signed_data(timestamp: u64, signed_entry: &[u8], extensions: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(SCT_VERSION_V1);
    out.push(SIGNATURE_TYPE_CERTIFICATE_TIMESTAMP);
    out.extend_from_slice(&timestamp.to_be_bytes());
    out.extend_from_slice(&LOG_ENTRY_TYPE_PRECERT.to_be_bytes());
    out.extend_from_slice(signed_entry);
    out.extend_from_slice(&(extensions.len() as u16).to_be_bytes());
    out.extend_from_slice(extensions);
    out
}

fn ms_to_datetime(timestamp_ms: u64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(timestamp_ms as i64)
        .single()
        .unwrap_or_default()
}

/// Cryptographically verify every SCT embedded in `full_cert_path`'s leaf against any
/// configured log (irrespective of that log's validity window — window gating happens
/// separately, see [`verify_sct`]).
fn verify_signed_certificate_timestamps(
    full_cert_path: &CertPath,
    ct_logs: &[TransparencyLog],
) -> Result<CtVerificationResult, VerificationError> {
    let leaf_der = full_cert_path
        .first()
        .ok_or(VerificationError::EmptyCertPath)?;
    let issuer_der = full_cert_path
        .get(1)
        .ok_or(VerificationError::EmptyCertPath)?;

    let leaf: X509Certificate = parse_der_certificate(leaf_der)?;

    let sct_bytes = get_embedded_scts(&leaf)?.ok_or(VerificationError::NoEmbeddedScts)?;
    let scts = decode_sct_list(&sct_bytes).map_err(|_| VerificationError::NoEmbeddedScts)?;

    let stripped_tbs = precert_tbs_der(leaf_der).map_err(|e| {
        VerificationError::Certificate(crate::error::CertificateError::TbsEncoding(e))
    })?;
    let issuer_spki_der = issuer_spki_der(issuer_der).map_err(|e| {
        VerificationError::Certificate(crate::error::CertificateError::TbsEncoding(e))
    })?;
    let signed_entry = precert_signed_entry(&issuer_spki_der, &stripped_tbs);

    let mut result = CtVerificationResult::default();
    for sct in scts {
        if sct.version != SCT_VERSION_V1 {
            result.invalid_scts.push(sct);
            continue;
        }

        let Some(log) = ct_logs.iter().find(|log| log.log_id == sct.log_id) else {
            result.invalid_scts.push(sct);
            continue;
        };

        if sct.signature.hash_algorithm != HASH_ALGORITHM_SHA256 {
            result.invalid_scts.push(sct);
            continue;
        }

        let message = sct_signed_data(sct.timestamp, &signed_entry, &sct.extensions);
        let hash_alg = crate::crypto::hash_alg_for_tls_octet(sct.signature.hash_algorithm);
        let valid = match hash_alg {
            Some(hash_alg) => log
                .public_key
                .verify_signature_with_hash(&message, &sct.signature.signature, hash_alg)
                .is_ok(),
            None => false,
        };

        if valid {
            result.valid_scts.push(sct);
        } else {
            result.invalid_scts.push(sct);
        }
    }

    Ok(result)
}

/// Top-level SCT verification step (§4.4). Requires a `full_cert_path` that already passed
/// [`crate::pkix::validate_cert_path`].
pub fn verify_sct(
    full_cert_path: &CertPath,
    ct_logs: &[TransparencyLog],
    sct_quorum: usize,
) -> Result<CtVerificationResult, VerificationError> {
    if ct_logs.is_empty() {
        return Err(VerificationError::NoCtLogsConfigured);
    }

    let leaf_der = full_cert_path
        .first()
        .ok_or(VerificationError::EmptyCertPath)?;
    let leaf: X509Certificate = parse_der_certificate(leaf_der)?;
    if get_embedded_scts(&leaf)?.is_none() {
        return Err(VerificationError::NoEmbeddedScts);
    }

    let crypto_result = verify_signed_certificate_timestamps(full_cert_path, ct_logs)?;

    let accepted = crypto_result
        .valid_scts
        .iter()
        .filter(|sct| {
            let entry_time = ms_to_datetime(sct.timestamp);
            TransparencyLog::find(ct_logs, &sct.log_id, entry_time).is_some()
        })
        .count();

    if accepted < sct_quorum {
        return Err(VerificationError::AllSctsInvalid {
            total: crypto_result.total(),
        });
    }

    Ok(crypto_result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_single_sct_round_trips_fields() {
        let mut bytes = Vec::new();
        bytes.push(0u8); // version
        bytes.extend_from_slice(&[7u8; 32]); // log_id
        bytes.extend_from_slice(&123456789u64.to_be_bytes()); // timestamp
        bytes.extend_from_slice(&0u16.to_be_bytes()); // extensions len
        bytes.push(4); // hash alg sha256
        bytes.push(3); // sig alg ecdsa
        bytes.extend_from_slice(&3u16.to_be_bytes()); // sig len
        bytes.extend_from_slice(&[9, 9, 9]);

        let sct = decode_single_sct(&bytes).unwrap();
        assert_eq!(sct.version, 0);
        assert_eq!(sct.log_id, [7u8; 32]);
        assert_eq!(sct.timestamp, 123456789);
        assert!(sct.extensions.is_empty());
        assert_eq!(sct.signature.hash_algorithm, 4);
        assert_eq!(sct.signature.signature_algorithm, 3);
        assert_eq!(sct.signature.signature, vec![9, 9, 9]);
    }

    #[test]
    fn decode_sct_list_handles_multiple_entries() {
        let mut single = Vec::new();
        single.push(0u8);
        single.extend_from_slice(&[1u8; 32]);
        single.extend_from_slice(&1u64.to_be_bytes());
        single.extend_from_slice(&0u16.to_be_bytes());
        single.push(4);
        single.push(3);
        single.extend_from_slice(&1u16.to_be_bytes());
        single.push(0xaa);

        let mut list_body = Vec::new();
        list_body.extend_from_slice(&(single.len() as u16).to_be_bytes());
        list_body.extend_from_slice(&single);
        list_body.extend_from_slice(&(single.len() as u16).to_be_bytes());
        list_body.extend_from_slice(&single);

        let mut full = Vec::new();
        full.extend_from_slice(&(list_body.len() as u16).to_be_bytes());
        full.extend_from_slice(&list_body);

        let scts = decode_sct_list(&full).unwrap();
        assert_eq!(scts.len(), 2);
    }

    #[test]
    fn precert_signed_entry_layout_is_hash_then_u24_len_then_tbs() {
        let issuer_spki = b"fake-spki-bytes";
        let tbs = vec![1u8, 2, 3, 4, 5];
        let entry = precert_signed_entry(issuer_spki, &tbs);
        assert_eq!(&entry[0..32], &sha256(issuer_spki));
        assert_eq!(entry[32], 0);
        assert_eq!(entry[33], 0);
        assert_eq!(entry[34], 5);
        assert_eq!(&entry[35..], &tbs[..]);
    }

    #[test]
    fn sct_signed_data_matches_rfc6962_layout() {
        let signed_entry = vec![0xaa; 4];
        let extensions = vec![0xbb, 0xcc];
        let data = sct_signed_data(42, &signed_entry, &extensions);
        assert_eq!(data[0], SCT_VERSION_V1);
        assert_eq!(data[1], SIGNATURE_TYPE_CERTIFICATE_TIMESTAMP);
        assert_eq!(&data[2..10], &42u64.to_be_bytes());
        assert_eq!(&data[10..12], &LOG_ENTRY_TYPE_PRECERT.to_be_bytes());
        assert_eq!(&data[12..16], &signed_entry[..]);
        assert_eq!(&data[16..18], &2u16.to_be_bytes());
        assert_eq!(&data[18..], &extensions[..]);
    }
}
