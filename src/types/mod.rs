pub mod cert;
pub mod sct;

pub use cert::{CertPath, CertificateAuthority, TimeWindow, TransparencyLog, TrustAnchor};
pub use sct::{CtVerificationResult, DigitallySigned, SignedCertificateTimestamp};
