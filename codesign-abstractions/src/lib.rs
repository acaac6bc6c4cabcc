// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Service boundary and value types for code-signing trust verification.
//!
//! This crate defines the seam between the trust-decision core
//! (`codesign-checker`) and the platform code-signing service that actually
//! performs cryptographic signature validation. The core never verifies
//! signatures itself; it orchestrates calls through [`SigningService`] and
//! interprets the results.
//!
//! Everything here is either an injectable trait or an immutable value type,
//! so a deterministic test double can stand in for the real platform service.

mod certificate;
mod service;
mod signing_info;
mod status;

pub use certificate::{Certificate, CertificateChain, CertificateParser, DerCertificateParser};
pub use service::{
    CodeHandle, CompiledRequirement, ServiceError, SigningService, TrustRequirement,
    ValidationFlags,
};
pub use signing_info::{SigningInfo, SigningInfoValue, KEY_CERTIFICATES, KEY_IDENTIFIER};
pub use status::ValidationStatus;
