// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signature validation dispatch.
//!
//! Validation outcomes are status values, never errors: an unsigned or
//! tampered binary is an ordinary, expected result. The flag profile depends
//! on the reference kind:
//!
//! - `Static` skips bundle-resource hashing but still validates nested
//!   embedded code. Full resource validation can be orders of magnitude
//!   slower for large bundles and adds nothing to these trust decisions.
//! - `Dynamic` uses the default, full profile; resource hashing is not a
//!   cost concern for a single running process.

use tracing::debug;

use codesign_abstractions::{
    CompiledRequirement, TrustRequirement, ValidationFlags, ValidationStatus,
};

use crate::reference::{CodeKind, CodeReference};

impl CodeReference {
    /// Validate basic signature integrity, with no trust requirement.
    pub fn validate(&self) -> ValidationStatus {
        self.check_with(None)
    }

    /// Validate against the `"anchor apple"` requirement.
    pub fn validate_apple_anchor(&self) -> ValidationStatus {
        self.validate_with_requirement(&TrustRequirement::apple_anchor())
    }

    /// Validate against the `"anchor apple generic"` requirement.
    pub fn validate_apple_anchor_generic(&self) -> ValidationStatus {
        self.validate_with_requirement(&TrustRequirement::apple_anchor_generic())
    }

    /// Validate against an arbitrary trust requirement.
    ///
    /// A requirement expression that fails to compile yields
    /// [`ValidationStatus::RequirementCompileFailed`]. It is never downgraded
    /// to "no requirement": that would turn a malformed expression into
    /// unrestricted trust.
    pub fn validate_with_requirement(&self, requirement: &TrustRequirement) -> ValidationStatus {
        let compiled = match self.service.compile_requirement(requirement.expression()) {
            Ok(c) => c,
            Err(error) => {
                debug!(requirement = %requirement, %error, "requirement failed to compile");
                return ValidationStatus::RequirementCompileFailed;
            }
        };
        self.check_with(Some(&compiled))
    }

    fn check_with(&self, requirement: Option<&CompiledRequirement>) -> ValidationStatus {
        let flags = match self.kind() {
            CodeKind::Static => ValidationFlags::NO_RESOURCES | ValidationFlags::CHECK_NESTED,
            CodeKind::Dynamic => ValidationFlags::default(),
        };

        let status = self.service.check_validity(&self.handle, flags, requirement);
        debug!(kind = ?self.kind(), ?flags, %status, "signature validation");
        status
    }
}
