use x509_parser::prelude::*;

use crate::error::CertificateError;

pub fn parse_der_certificate(der: &[u8]) -> Result<X509Certificate, CertificateError> {
    let (_, cert) =
        X509Certificate::from_der(der).map_err(|e| CertificateError::Parse(e.to_string()))?;
    Ok(cert)
}
