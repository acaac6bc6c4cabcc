// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Opaque certificate values and chains.
//!
//! [`Certificate`] exposes only the organizational attributes the trust
//! decisions need. Identity is structural: two values are equal iff they
//! represent the same cryptographic certificate, which we pin to the SHA-256
//! fingerprint of the DER encoding.

use std::hash::{Hash, Hasher};

use sha2::{Digest, Sha256};

/// An opaque certificate with read-only organizational attributes.
#[derive(Debug, Clone)]
pub struct Certificate {
    fingerprint: [u8; 32],
    org_name: Option<String>,
    org_unit: Option<String>,
    common_name: Option<String>,
}

impl Certificate {
    /// Construct from already-extracted attributes. Used by parsers and test
    /// doubles; ordinary callers obtain certificates from a chain.
    pub fn new(
        fingerprint: [u8; 32],
        org_name: Option<String>,
        org_unit: Option<String>,
        common_name: Option<String>,
    ) -> Self {
        Self {
            fingerprint,
            org_name,
            org_unit,
            common_name,
        }
    }

    /// SHA-256 fingerprint of the DER encoding.
    pub fn fingerprint(&self) -> &[u8; 32] {
        &self.fingerprint
    }

    /// Lowercase hex rendering of the fingerprint, for diagnostics.
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint)
    }

    /// Subject organization name (O), if present.
    pub fn org_name(&self) -> Option<&str> {
        self.org_name.as_deref()
    }

    /// Subject organizational unit (OU), if present.
    pub fn org_unit(&self) -> Option<&str> {
        self.org_unit.as_deref()
    }

    /// Subject common name (CN), if present.
    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }
}

// Equality is the cryptographic identity, not the display attributes.
impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for Certificate {}

impl Hash for Certificate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint.hash(state);
    }
}

/// Ordered certificate sequence: leaf first, anchor last.
///
/// Two chains are equal iff they are element-wise equal in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CertificateChain {
    certs: Vec<Certificate>,
}

impl CertificateChain {
    pub fn new(certs: Vec<Certificate>) -> Self {
        Self { certs }
    }

    /// The leaf (end-entity) certificate, or `None` for an empty chain.
    pub fn leaf(&self) -> Option<&Certificate> {
        self.certs.first()
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Certificate> {
        self.certs.iter()
    }
}

impl<'a> IntoIterator for &'a CertificateChain {
    type Item = &'a Certificate;
    type IntoIter = std::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.certs.iter()
    }
}

impl FromIterator<Certificate> for CertificateChain {
    fn from_iter<I: IntoIterator<Item = Certificate>>(iter: I) -> Self {
        Self {
            certs: iter.into_iter().collect(),
        }
    }
}

/// Wraps raw certificate material into [`Certificate`] values.
///
/// Contract: return `None` when the raw bytes cannot be understood. Chain
/// builders skip such entries rather than failing the whole chain.
pub trait CertificateParser: Send + Sync {
    fn wrap_certificate(&self, raw: &[u8]) -> Option<Certificate>;
}

/// The default parser: DER-encoded X.509 input.
///
/// Extracts subject O / OU / CN and fingerprints the exact DER bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerCertificateParser;

impl CertificateParser for DerCertificateParser {
    fn wrap_certificate(&self, raw: &[u8]) -> Option<Certificate> {
        let (_, cert) = x509_parser::parse_x509_certificate(raw).ok()?;
        let subject = cert.subject();

        let org_name = first_attr(subject.iter_organization());
        let org_unit = first_attr(subject.iter_organizational_unit());
        let common_name = first_attr(subject.iter_common_name());

        let fingerprint: [u8; 32] = Sha256::digest(raw).into();
        Some(Certificate::new(fingerprint, org_name, org_unit, common_name))
    }
}

fn first_attr<'a>(
    mut attrs: impl Iterator<Item = &'a x509_parser::x509::AttributeTypeAndValue<'a>>,
) -> Option<String> {
    attrs.next().and_then(|a| a.as_str().ok()).map(str::to_owned)
}
