// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Identity comparison between two code references.
//!
//! Two strengths of "same signer":
//!
//! - [`signing_chain_matches`](CodeReference::signing_chain_matches): strict
//!   identity. Same certificates, same order, whole chain.
//! - [`team_signing_matches`](CodeReference::team_signing_matches): same
//!   development team. Survives re-signed rebuilds where the exact chain
//!   differs, but only when both sides independently prove descent from the
//!   platform anchor.

use crate::reference::CodeReference;

impl CodeReference {
    /// Strict signer identity: the two chains are element-wise equal in
    /// order.
    pub fn signing_chain_matches(&self, other: &CodeReference) -> bool {
        self.certificates() == other.certificates()
    }

    /// Relaxed team identity: equal leaf organizational units, and both
    /// references pass `anchor apple generic` validation.
    ///
    /// Both anchor checks run unconditionally. Each side must prove its own
    /// platform-anchored trust; an org-unit match alone is never a positive
    /// result. A reference with no certificates at all (no leaf) compares
    /// `false`.
    pub fn team_signing_matches(&self, other: &CodeReference) -> bool {
        let self_anchored = self.validate_apple_anchor_generic().is_valid();
        let other_anchored = other.validate_apple_anchor_generic().is_valid();

        let (Some(mine), Some(theirs)) = (self.leaf_certificate(), other.leaf_certificate())
        else {
            return false;
        };

        let unit_matches = match (mine.org_unit(), theirs.org_unit()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };

        unit_matches && self_anchored && other_anchored
    }
}
