// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The platform signing-service boundary.
//!
//! [`SigningService`] abstracts the platform facility that resolves code
//! objects and validates their signatures. Implementations own the actual
//! verification machinery; callers only see opaque handles and status values.

use std::any::Any;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::signing_info::SigningInfo;
use crate::status::ValidationStatus;

/// An opaque, exclusively owned handle to a platform code object.
///
/// A handle is acquired by one of the `resolve_*` operations and released
/// exactly once when dropped. Handles are deliberately not `Clone`: sharing a
/// platform resource across references would break the release-once contract.
pub struct CodeHandle {
    raw: Box<dyn Any + Send + Sync>,
}

impl CodeHandle {
    /// Wrap a service-specific payload into an opaque handle.
    pub fn new(raw: impl Any + Send + Sync) -> Self {
        Self { raw: Box::new(raw) }
    }

    /// Downcast the payload back to the service's concrete type.
    ///
    /// Returns `None` when the handle was produced by a different service
    /// implementation; callers must treat that as "not verifiable", never as
    /// trusted.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.raw.downcast_ref::<T>()
    }
}

impl fmt::Debug for CodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeHandle").finish_non_exhaustive()
    }
}

/// A trust requirement expression, uncompiled.
///
/// The expression language belongs to the platform service; this type only
/// carries the source text (e.g. `"anchor apple"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrustRequirement {
    expression: String,
}

impl TrustRequirement {
    /// Requirement satisfied only by code signed by the platform vendor itself.
    pub fn apple_anchor() -> Self {
        Self::custom("anchor apple")
    }

    /// Requirement satisfied by any chain that terminates at the platform
    /// vendor's anchor, including third-party developer certificates.
    pub fn apple_anchor_generic() -> Self {
        Self::custom("anchor apple generic")
    }

    /// An arbitrary requirement expression.
    pub fn custom(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
        }
    }

    /// The requirement source text.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl fmt::Display for TrustRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// A requirement expression compiled by the platform service.
///
/// Compilation may fail; a failed compile must surface as
/// [`ValidationStatus::RequirementCompileFailed`] rather than degrading to an
/// empty (always-passing) requirement.
pub struct CompiledRequirement {
    expression: String,
    raw: Box<dyn Any + Send + Sync>,
}

impl CompiledRequirement {
    /// Wrap a service-specific compiled form together with its source text.
    pub fn new(expression: impl Into<String>, raw: impl Any + Send + Sync) -> Self {
        Self {
            expression: expression.into(),
            raw: Box::new(raw),
        }
    }

    /// The source text this requirement was compiled from.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Downcast the compiled payload back to the service's concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.raw.downcast_ref::<T>()
    }
}

impl fmt::Debug for CompiledRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRequirement")
            .field("expression", &self.expression)
            .finish_non_exhaustive()
    }
}

bitflags::bitflags! {
    /// Flag profile passed to [`SigningService::check_validity`].
    ///
    /// The empty set requests the service's default, full validation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ValidationFlags: u32 {
        /// Skip hashing of bundle resources. Full resource validation can be
        /// orders of magnitude slower for large bundles and is unnecessary
        /// for the trust decisions this core supports.
        const NO_RESOURCES = 1 << 0;
        /// Still validate nested embedded code when resources are skipped.
        const CHECK_NESTED = 1 << 1;
    }
}

impl Default for ValidationFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Errors reported by a platform service implementation.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No code object matched the given path, pid, or self lookup.
    #[error("no matching code object")]
    NotFound,

    /// The service could not read the code object.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// The requirement expression did not compile.
    #[error("invalid requirement expression: {0}")]
    InvalidRequirement(String),

    /// Any other platform-side failure.
    #[error("platform service failure: {0}")]
    Internal(String),
}

/// The platform code-signing service.
///
/// All operations are synchronous and may block on I/O (disk reads for
/// on-disk binaries). Implementations must be safe to share across threads.
pub trait SigningService: Send + Sync {
    /// Resolve a filesystem path to a static code object.
    fn resolve_path(&self, path: &Path) -> Result<CodeHandle, ServiceError>;

    /// Resolve a running process (by guest attribute lookup on its pid) to a
    /// dynamic code object.
    fn resolve_guest_by_pid(&self, pid: u32) -> Result<CodeHandle, ServiceError>;

    /// Resolve the calling process's own code identity.
    fn resolve_self(&self) -> Result<CodeHandle, ServiceError>;

    /// Compile a requirement expression into the service's internal form.
    fn compile_requirement(&self, expression: &str) -> Result<CompiledRequirement, ServiceError>;

    /// Validate the code object's signature.
    ///
    /// Validation outcomes are ordinary values: an unsigned or tampered
    /// binary is not an exceptional condition. A handle this service does not
    /// recognize must yield [`ValidationStatus::NotVerifiable`].
    fn check_validity(
        &self,
        handle: &CodeHandle,
        flags: ValidationFlags,
        requirement: Option<&CompiledRequirement>,
    ) -> ValidationStatus;

    /// Copy the signing metadata for a code object.
    fn copy_signing_information(&self, handle: &CodeHandle) -> Result<SigningInfo, ServiceError>;

    /// Resolve the code object's current on-disk path, if any.
    ///
    /// This reflects live system state and is never cached by callers.
    fn copy_path(&self, handle: &CodeHandle) -> Option<PathBuf>;
}
