// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signing metadata as an immutable key/value snapshot.
//!
//! [`SigningInfo`] is a fact about a fixed binary at the moment it was
//! queried, not a live view. The checker memoizes it per reference and never
//! recomputes it, even if the underlying binary changes afterwards.

use std::collections::BTreeMap;

/// Well-known key under which the raw certificate sequence is stored.
pub const KEY_CERTIFICATES: &str = "certificates";

/// Well-known key for the code object's signing identifier.
pub const KEY_IDENTIFIER: &str = "identifier";

/// A single signing-metadata value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningInfoValue {
    Text(String),
    Integer(i64),
    Bytes(Vec<u8>),
    /// Raw certificate sequence, leaf first, each entry DER-encoded.
    Certificates(Vec<Vec<u8>>),
}

/// Immutable signing-metadata map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SigningInfo {
    entries: BTreeMap<String, SigningInfoValue>,
}

impl SigningInfo {
    /// The empty map (an unsigned binary reports no signing metadata).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from key/value pairs. Later duplicates win.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, SigningInfoValue)>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Builder-style insertion, used by services assembling a snapshot.
    pub fn with(mut self, key: impl Into<String>, value: SigningInfoValue) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SigningInfoValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The raw DER certificate sequence, or empty when the binary is unsigned
    /// or the metadata carries no certificate entry.
    pub fn raw_certificates(&self) -> &[Vec<u8>] {
        match self.entries.get(KEY_CERTIFICATES) {
            Some(SigningInfoValue::Certificates(certs)) => certs.as_slice(),
            _ => &[],
        }
    }
}
