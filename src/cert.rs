//! Certificate-path utilities operating on raw DER bytes (§4.1). `contains_parent`/`trim_parent`
//! deliberately compare byte slices, never reparsed certificate objects — suffix semantics must
//! hold exactly or trust decisions downstream become silently wrong.

use x509_parser::prelude::*;

use crate::crypto::PublicKey;
use crate::error::CertificateError;
use crate::parser::parse_der_certificate;
use crate::types::CertPath;

/// OID for the embedded-SCT-list X.509v3 extension (RFC 6962 §3.3).
pub const OID_EMBEDDED_SCT_LIST: &str = "1.3.6.1.4.1.11129.2.4.2";

/// Certificate at index 0. Fails if `path` is empty.
pub fn get_leaf(path: &CertPath) -> Result<X509Certificate<'_>, CertificateError> {
    let leaf_der = path
        .first()
        .ok_or_else(|| CertificateError::Parse("certificate path is empty".to_string()))?;
    parse_der_certificate(leaf_der)
}

/// True iff the last certificate's subject equals its issuer and its signature verifies
/// against its own public key.
pub fn is_self_signed(path: &CertPath) -> bool {
    let Some(tail_der) = path.last() else {
        return false;
    };
    let Ok(tail) = parse_der_certificate(tail_der) else {
        return false;
    };
    if tail.subject() != tail.issuer() {
        return false;
    }
    PublicKey::from_certificate(&tail)
        .and_then(|key| {
            key.verify_signature(
                tail.tbs_certificate.as_ref(),
                tail.signature_value.data.as_ref(),
                &tail.signature_algorithm,
            )
        })
        .is_ok()
}

/// True iff `parent_path` is a contiguous suffix of `path`, compared byte-for-byte.
pub fn contains_parent(path: &CertPath, parent_path: &CertPath) -> bool {
    if parent_path.len() > path.len() {
        return false;
    }
    let start = path.len() - parent_path.len();
    path[start..] == parent_path[..]
}

/// `path` with the trailing `parent_path` suffix removed. Caller must have already confirmed
/// `contains_parent(path, parent_path)`.
pub fn trim_parent(path: &CertPath, parent_path: &CertPath) -> CertPath {
    let keep = path.len().saturating_sub(parent_path.len());
    path[..keep].to_vec()
}

/// `child_path` concatenated with `parent_path` (child first, parent last).
pub fn append(parent_path: &CertPath, child_path: &CertPath) -> CertPath {
    let mut full = child_path.clone();
    full.extend(parent_path.iter().cloned());
    full
}

/// `Some(bytes)` of the unwrapped TLS `SignedCertificateTimestampList` if `leaf` carries the
/// embedded-SCT extension, else `None`. Both DER-OCTET-STRING layers are unwrapped: x509-parser
/// already strips the outer `extnValue` OCTET STRING for us, leaving content that is itself a
/// DER-encoded OCTET STRING wrapping the TLS-encoded list.
pub fn get_embedded_scts(leaf: &X509Certificate) -> Result<Option<Vec<u8>>, CertificateError> {
    let Some(ext) = leaf
        .extensions()
        .iter()
        .find(|ext| ext.oid.to_string() == OID_EMBEDDED_SCT_LIST)
    else {
        return Ok(None);
    };

    strip_der_octet_string(ext.value).map(Some)
}

/// Decode a single DER OCTET STRING TLV and return its content, rejecting anything but a
/// primitive (non-constructed) encoding.
fn strip_der_octet_string(data: &[u8]) -> Result<Vec<u8>, CertificateError> {
    const OCTET_STRING_TAG: u8 = 0x04;

    let malformed = || CertificateError::Parse("malformed embedded-SCT extension".to_string());

    let tag = *data.first().ok_or_else(malformed)?;
    if tag != OCTET_STRING_TAG {
        return Err(malformed());
    }

    let first_len_byte = *data.get(1).ok_or_else(malformed)?;
    let (len, header_len) = if first_len_byte & 0x80 == 0 {
        (first_len_byte as usize, 2usize)
    } else {
        let num_len_bytes = (first_len_byte & 0x7f) as usize;
        if num_len_bytes == 0 || num_len_bytes > 4 {
            return Err(malformed());
        }
        let len_bytes = data
            .get(2..2 + num_len_bytes)
            .ok_or_else(malformed)?;
        let mut len: usize = 0;
        for b in len_bytes {
            len = (len << 8) | (*b as usize);
        }
        (len, 2 + num_len_bytes)
    };

    data.get(header_len..header_len + len)
        .map(|content| content.to_vec())
        .ok_or_else(malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_parent_matches_exact_suffix() {
        let path: CertPath = vec![vec![1], vec![2], vec![3]];
        let parent: CertPath = vec![vec![2], vec![3]];
        assert!(contains_parent(&path, &parent));

        let not_parent: CertPath = vec![vec![9], vec![3]];
        assert!(!contains_parent(&path, &not_parent));
    }

    #[test]
    fn contains_parent_rejects_longer_than_path() {
        let path: CertPath = vec![vec![1]];
        let parent: CertPath = vec![vec![1], vec![2]];
        assert!(!contains_parent(&path, &parent));
    }

    #[test]
    fn trim_parent_removes_exact_suffix() {
        let path: CertPath = vec![vec![1], vec![2], vec![3]];
        let parent: CertPath = vec![vec![2], vec![3]];
        assert_eq!(trim_parent(&path, &parent), vec![vec![1]]);
    }

    #[test]
    fn append_puts_child_first_parent_last() {
        let parent: CertPath = vec![vec![9], vec![10]];
        let child: CertPath = vec![vec![1], vec![2]];
        assert_eq!(append(&parent, &child), vec![vec![1], vec![2], vec![9], vec![10]]);
    }

    #[test]
    fn append_then_trim_round_trips_to_child() {
        let parent: CertPath = vec![vec![9], vec![10]];
        let child: CertPath = vec![vec![1], vec![2]];
        let full = append(&parent, &child);
        assert_eq!(trim_parent(&full, &parent), child);
    }

    #[test]
    fn get_leaf_fails_on_empty_path() {
        let path: CertPath = vec![];
        assert!(get_leaf(&path).is_err());
    }

    #[test]
    fn is_self_signed_false_for_empty_path() {
        let path: CertPath = vec![];
        assert!(!is_self_signed(&path));
    }

    #[test]
    fn strip_der_octet_string_short_form() {
        let tlv = [0x04, 0x03, 0xaa, 0xbb, 0xcc];
        assert_eq!(strip_der_octet_string(&tlv).unwrap(), vec![0xaa, 0xbb, 0xcc]);
    }

    #[test]
    fn strip_der_octet_string_long_form() {
        let mut tlv = vec![0x04, 0x81, 0x80];
        tlv.extend(std::iter::repeat(0x42).take(128));
        let content = strip_der_octet_string(&tlv).unwrap();
        assert_eq!(content.len(), 128);
        assert!(content.iter().all(|&b| b == 0x42));
    }

    #[test]
    fn strip_der_octet_string_rejects_wrong_tag() {
        let tlv = [0x02, 0x01, 0x00];
        assert!(strip_der_octet_string(&tlv).is_err());
    }
}
