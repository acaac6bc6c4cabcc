// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate chain derivation.
//!
//! The chain is built once per reference from the raw certificate sequence
//! in the signing metadata, under the same single-computation discipline as
//! the metadata itself. An entry that fails to wrap is dropped and the chain
//! shortens; that is accepted degradation, not a fatal condition.

use tracing::warn;

use codesign_abstractions::{Certificate, CertificateChain};

use crate::reference::CodeReference;

impl CodeReference {
    /// The certificate chain that signed this binary, leaf first.
    ///
    /// Empty for an unsigned binary.
    pub fn certificates(&self) -> &CertificateChain {
        self.certificates.get_or_init(|| {
            let raw = self.signing_info().raw_certificates();
            let mut certs = Vec::with_capacity(raw.len());
            for (index, der) in raw.iter().enumerate() {
                match self.parser.wrap_certificate(der) {
                    Some(cert) => certs.push(cert),
                    None => {
                        warn!(index, "dropping certificate that failed to wrap");
                    }
                }
            }
            CertificateChain::new(certs)
        })
    }

    /// The leaf certificate, or `None` for an unsigned binary.
    pub fn leaf_certificate(&self) -> Option<&Certificate> {
        self.certificates().leaf()
    }
}
