// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Validation status values.
//!
//! A status is a structured result, not an error: callers stay in control of
//! the allow/block decision and failure kinds remain distinguishable.

use std::fmt;

/// Outcome of a signature validation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStatus {
    /// The signature is valid and every requested requirement is satisfied.
    Valid,
    /// The code object carries no signature at all.
    SignatureMissing,
    /// A signature is present but does not verify (tampered or corrupt).
    SignatureBroken,
    /// The signature verifies but the trust requirement is not met.
    RequirementUnsatisfied,
    /// The requirement expression failed to compile. This is deliberately a
    /// distinct failure kind: a failed compile must never be mistaken for a
    /// passing empty requirement.
    RequirementCompileFailed,
    /// The code object cannot be verified by the service at all.
    NotVerifiable,
}

impl ValidationStatus {
    /// Returns `true` only for [`ValidationStatus::Valid`].
    pub fn is_valid(self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationStatus::Valid => "valid",
            ValidationStatus::SignatureMissing => "signature missing",
            ValidationStatus::SignatureBroken => "signature broken",
            ValidationStatus::RequirementUnsatisfied => "requirement unsatisfied",
            ValidationStatus::RequirementCompileFailed => "requirement compile failed",
            ValidationStatus::NotVerifiable => "not verifiable",
        };
        f.write_str(s)
    }
}
