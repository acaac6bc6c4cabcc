// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Memoized signing metadata.
//!
//! Signing info is a snapshot of a fixed binary, computed at most once per
//! reference. Concurrent first callers block on the same initialization and
//! all observe the identical cached value; the platform is never queried
//! twice, and the snapshot is never invalidated even if the binary changes
//! on disk afterwards.

use std::path::PathBuf;

use tracing::debug;

use codesign_abstractions::SigningInfo;

use crate::reference::CodeReference;

impl CodeReference {
    /// The signing metadata snapshot for this reference.
    ///
    /// A platform query failure memoizes the empty map: an unsigned or
    /// unreadable binary is an ordinary outcome, and the once-only guarantee
    /// rules out retrying the query later.
    pub fn signing_info(&self) -> &SigningInfo {
        self.signing_info.get_or_init(|| {
            match self.service.copy_signing_information(&self.handle) {
                Ok(info) => info,
                Err(error) => {
                    debug!(%error, "signing information unavailable, memoizing empty snapshot");
                    SigningInfo::new()
                }
            }
        })
    }

    /// The resolved on-disk path of this reference, if any.
    ///
    /// Unlike [`signing_info`](Self::signing_info) this is a live query and
    /// is not cached; it reflects current system state.
    pub fn binary_path(&self) -> Option<PathBuf> {
        self.service.copy_path(&self.handle)
    }
}
