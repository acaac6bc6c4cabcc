// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Test-only utilities for composing code-signing scenarios.
//!
//! This crate exists to keep the production `codesign-checker` surface
//! focused while still supporting concise test composition in this repo.
//! [`FakeSigningService`] is a fully deterministic, scriptable stand-in for
//! the platform service: it records the flag profiles it receives, counts
//! metadata and path queries, and tracks handle drops.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use codesign_abstractions::{
    CodeHandle, CompiledRequirement, ServiceError, SigningInfo, SigningInfoValue, SigningService,
    TrustRequirement, ValidationFlags, ValidationStatus, KEY_CERTIFICATES,
};

/// Scripted description of one code object.
#[derive(Clone)]
pub struct FakeBinary {
    status: ValidationStatus,
    requirement_statuses: Vec<(String, ValidationStatus)>,
    signing_info: SigningInfo,
    signing_info_unreadable: bool,
    path: Option<PathBuf>,
}

impl FakeBinary {
    /// A binary with no signature at all.
    pub fn unsigned() -> Self {
        Self {
            status: ValidationStatus::SignatureMissing,
            requirement_statuses: Vec::new(),
            signing_info: SigningInfo::new(),
            signing_info_unreadable: false,
            path: None,
        }
    }

    /// A validly signed binary whose metadata carries the given raw DER
    /// certificate sequence, leaf first.
    pub fn signed(chain_der: Vec<Vec<u8>>) -> Self {
        Self {
            status: ValidationStatus::Valid,
            requirement_statuses: Vec::new(),
            signing_info: SigningInfo::new()
                .with(KEY_CERTIFICATES, SigningInfoValue::Certificates(chain_der)),
            signing_info_unreadable: false,
            path: None,
        }
    }

    /// Override the requirement-free validation outcome.
    pub fn with_status(mut self, status: ValidationStatus) -> Self {
        self.status = status;
        self
    }

    /// Script the outcome for a specific requirement expression.
    pub fn with_requirement_status(
        mut self,
        requirement: &TrustRequirement,
        status: ValidationStatus,
    ) -> Self {
        self.requirement_statuses
            .push((requirement.expression().to_owned(), status));
        self
    }

    /// Convenience: this binary passes `anchor apple generic`.
    pub fn anchored_generic(self) -> Self {
        self.with_requirement_status(
            &TrustRequirement::apple_anchor_generic(),
            ValidationStatus::Valid,
        )
    }

    /// Replace the whole signing-info snapshot.
    pub fn with_signing_info(mut self, info: SigningInfo) -> Self {
        self.signing_info = info;
        self
    }

    /// Make `copy_signing_information` fail for this binary.
    pub fn with_unreadable_signing_info(mut self) -> Self {
        self.signing_info_unreadable = true;
        self
    }

    /// Script the resolved on-disk path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

// Handle payload handed out by the fake; drop-counted so tests can assert
// release-exactly-once semantics.
struct FakeCodeObject {
    binary: FakeBinary,
    drops: Arc<AtomicUsize>,
}

impl Drop for FakeCodeObject {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Registry {
    by_path: HashMap<PathBuf, FakeBinary>,
    by_pid: HashMap<u32, FakeBinary>,
    self_binary: Option<FakeBinary>,
    rejected_requirements: HashSet<String>,
    recorded_flags: Vec<ValidationFlags>,
}

/// A deterministic in-memory signing service.
#[derive(Default)]
pub struct FakeSigningService {
    registry: Mutex<Registry>,
    signing_info_queries: AtomicUsize,
    path_queries: AtomicUsize,
    handle_drops: Arc<AtomicUsize>,
}

impl FakeSigningService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an on-disk binary.
    pub fn with_binary_at(self, path: impl Into<PathBuf>, binary: FakeBinary) -> Self {
        self.registry.lock().by_path.insert(path.into(), binary);
        self
    }

    /// Register a running process.
    pub fn with_process(self, pid: u32, binary: FakeBinary) -> Self {
        self.registry.lock().by_pid.insert(pid, binary);
        self
    }

    /// Register the calling process's own identity.
    pub fn with_self_identity(self, binary: FakeBinary) -> Self {
        self.registry.lock().self_binary = Some(binary);
        self
    }

    /// Make a requirement expression fail to compile.
    pub fn with_rejected_requirement(self, requirement: &TrustRequirement) -> Self {
        self.registry
            .lock()
            .rejected_requirements
            .insert(requirement.expression().to_owned());
        self
    }

    /// How many times `copy_signing_information` has run.
    pub fn signing_info_queries(&self) -> usize {
        self.signing_info_queries.load(Ordering::SeqCst)
    }

    /// How many times `copy_path` has run.
    pub fn path_queries(&self) -> usize {
        self.path_queries.load(Ordering::SeqCst)
    }

    /// How many handles produced by this service have been dropped.
    pub fn handle_drops(&self) -> usize {
        self.handle_drops.load(Ordering::SeqCst)
    }

    /// Flag profiles received by `check_validity`, in call order.
    pub fn recorded_flags(&self) -> Vec<ValidationFlags> {
        self.registry.lock().recorded_flags.clone()
    }

    fn handle_for(&self, binary: FakeBinary) -> CodeHandle {
        CodeHandle::new(FakeCodeObject {
            binary,
            drops: self.handle_drops.clone(),
        })
    }
}

impl SigningService for FakeSigningService {
    fn resolve_path(&self, path: &std::path::Path) -> Result<CodeHandle, ServiceError> {
        let binary = self
            .registry
            .lock()
            .by_path
            .get(path)
            .cloned()
            .ok_or(ServiceError::NotFound)?;
        Ok(self.handle_for(binary))
    }

    fn resolve_guest_by_pid(&self, pid: u32) -> Result<CodeHandle, ServiceError> {
        let binary = self
            .registry
            .lock()
            .by_pid
            .get(&pid)
            .cloned()
            .ok_or(ServiceError::NotFound)?;
        Ok(self.handle_for(binary))
    }

    fn resolve_self(&self) -> Result<CodeHandle, ServiceError> {
        let binary = self
            .registry
            .lock()
            .self_binary
            .clone()
            .ok_or(ServiceError::NotFound)?;
        Ok(self.handle_for(binary))
    }

    fn compile_requirement(&self, expression: &str) -> Result<CompiledRequirement, ServiceError> {
        if self.registry.lock().rejected_requirements.contains(expression) {
            return Err(ServiceError::InvalidRequirement(expression.to_owned()));
        }
        Ok(CompiledRequirement::new(expression, ()))
    }

    fn check_validity(
        &self,
        handle: &CodeHandle,
        flags: ValidationFlags,
        requirement: Option<&CompiledRequirement>,
    ) -> ValidationStatus {
        self.registry.lock().recorded_flags.push(flags);

        let Some(object) = handle.downcast_ref::<FakeCodeObject>() else {
            return ValidationStatus::NotVerifiable;
        };

        match requirement {
            None => object.binary.status,
            Some(req) => {
                let scripted = object
                    .binary
                    .requirement_statuses
                    .iter()
                    .find(|(expr, _)| expr == req.expression())
                    .map(|(_, status)| *status);
                match scripted {
                    Some(status) => status,
                    // An intact signature still fails an unscripted
                    // requirement; a broken/missing one reports its own kind.
                    None if object.binary.status.is_valid() => {
                        ValidationStatus::RequirementUnsatisfied
                    }
                    None => object.binary.status,
                }
            }
        }
    }

    fn copy_signing_information(&self, handle: &CodeHandle) -> Result<SigningInfo, ServiceError> {
        self.signing_info_queries.fetch_add(1, Ordering::SeqCst);
        let Some(object) = handle.downcast_ref::<FakeCodeObject>() else {
            return Err(ServiceError::Internal("foreign handle".into()));
        };
        if object.binary.signing_info_unreadable {
            return Err(ServiceError::AccessDenied("scripted".into()));
        }
        Ok(object.binary.signing_info.clone())
    }

    fn copy_path(&self, handle: &CodeHandle) -> Option<PathBuf> {
        self.path_queries.fetch_add(1, Ordering::SeqCst);
        handle
            .downcast_ref::<FakeCodeObject>()
            .and_then(|o| o.binary.path.clone())
    }
}

/// Generate a self-signed test certificate and return its DER encoding.
///
/// Each call uses a fresh key, so two certificates with identical subjects
/// still have distinct structural identities.
pub fn test_certificate_der(org: &str, unit: &str, common_name: &str) -> Vec<u8> {
    use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};

    let mut dn = DistinguishedName::new();
    dn.push(DnType::OrganizationName, org);
    dn.push(DnType::OrganizationalUnitName, unit);
    dn.push(DnType::CommonName, common_name);

    let mut params = CertificateParams::default();
    params.distinguished_name = dn;

    let key = KeyPair::generate().expect("test key generation");
    let cert = params.self_signed(&key).expect("test cert generation");
    cert.der().to_vec()
}
