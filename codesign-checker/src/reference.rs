// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Code reference construction and ownership.
//!
//! A [`CodeReference`] either constructs fully or not at all: there is no
//! default state and no partially initialized reference. The underlying
//! platform handle is owned exclusively and released exactly once, when the
//! reference is dropped.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;

use codesign_abstractions::{
    CertificateChain, CertificateParser, CodeHandle, DerCertificateParser, ServiceError,
    SigningInfo, SigningService,
};

/// Which kind of code object a reference is bound to.
///
/// The validator dispatches on this exhaustively; adding a kind is a
/// compile-time-visible change everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeKind {
    /// An on-disk binary's static code representation.
    Static,
    /// A running process's dynamic code representation.
    Dynamic,
}

/// Why a reference could not be constructed.
///
/// Construction failures are unrecoverable for that attempt; no usable
/// half-built reference ever exists.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("no code object at {path}: {source}")]
    PathNotFound {
        path: PathBuf,
        source: ServiceError,
    },

    #[error("no running process with pid {pid}: {source}")]
    ProcessNotFound { pid: u32, source: ServiceError },

    #[error("could not resolve own code identity: {source}")]
    SelfIntrospectionFailed { source: ServiceError },
}

/// An exclusively owned reference to a binary's code identity.
pub struct CodeReference {
    pub(crate) service: Arc<dyn SigningService>,
    pub(crate) parser: Arc<dyn CertificateParser>,
    pub(crate) handle: CodeHandle,
    kind: CodeKind,
    pub(crate) signing_info: OnceCell<SigningInfo>,
    pub(crate) certificates: OnceCell<CertificateChain>,
}

impl CodeReference {
    /// Resolve an on-disk binary.
    pub fn from_path(
        service: Arc<dyn SigningService>,
        path: impl AsRef<Path>,
    ) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let handle = service
            .resolve_path(path)
            .map_err(|source| ReferenceError::PathNotFound {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), "resolved static code reference");
        Ok(Self::wrap(service, handle, CodeKind::Static))
    }

    /// Resolve a running process by pid (guest-attribute lookup).
    pub fn from_pid(service: Arc<dyn SigningService>, pid: u32) -> Result<Self, ReferenceError> {
        let handle = service
            .resolve_guest_by_pid(pid)
            .map_err(|source| ReferenceError::ProcessNotFound { pid, source })?;
        debug!(pid, "resolved dynamic code reference");
        Ok(Self::wrap(service, handle, CodeKind::Dynamic))
    }

    /// Resolve the calling process's own code identity.
    pub fn for_self(service: Arc<dyn SigningService>) -> Result<Self, ReferenceError> {
        let handle = service
            .resolve_self()
            .map_err(|source| ReferenceError::SelfIntrospectionFailed { source })?;
        Ok(Self::wrap(service, handle, CodeKind::Dynamic))
    }

    /// Take ownership of an already-resolved platform handle.
    pub fn from_handle(service: Arc<dyn SigningService>, handle: CodeHandle, kind: CodeKind) -> Self {
        Self::wrap(service, handle, kind)
    }

    fn wrap(service: Arc<dyn SigningService>, handle: CodeHandle, kind: CodeKind) -> Self {
        Self {
            service,
            parser: Arc::new(DerCertificateParser),
            handle,
            kind,
            signing_info: OnceCell::new(),
            certificates: OnceCell::new(),
        }
    }

    /// Replace the certificate parser collaborator.
    ///
    /// Must be called before the chain is first derived; the memoized chain
    /// is never recomputed.
    pub fn with_certificate_parser(mut self, parser: Arc<dyn CertificateParser>) -> Self {
        self.parser = parser;
        self
    }

    /// The kind of code object this reference is bound to.
    pub fn kind(&self) -> CodeKind {
        self.kind
    }
}

impl fmt::Debug for CodeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeReference")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

// Diagnostics only; never used in trust decisions.
impl fmt::Display for CodeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CodeKind::Static => f.write_str("on-disk binary")?,
            CodeKind::Dynamic => f.write_str("in-memory binary")?,
        }

        match self.leaf_certificate().and_then(|c| c.org_name()) {
            Some(org) => write!(f, " signed by {org}")?,
            None => f.write_str(", unsigned")?,
        }

        if let Some(path) = self.binary_path() {
            write!(f, " at {}", path.display())?;
        }
        Ok(())
    }
}
