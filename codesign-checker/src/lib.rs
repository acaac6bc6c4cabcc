// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Code-signing trust verification.
//!
//! The central type is [`CodeReference`]: an exclusively owned handle to a
//! binary's code identity, either on disk (static) or running (dynamic). A
//! reference answers three questions a security agent needs:
//!
//! - Is the binary's signature valid, optionally under a trust requirement?
//! - What certificate chain signed it (leaf first)?
//! - Is another binary the same signer, or at least the same development
//!   team with platform-anchored trust on both sides?
//!
//! Cryptographic verification itself is delegated to an injected
//! [`codesign_abstractions::SigningService`]; this crate owns the
//! trust-decision logic and the memoization discipline around it.

mod chain;
mod identity;
mod reference;
mod signing_info;
mod validator;

pub use reference::{CodeKind, CodeReference, ReferenceError};

pub use codesign_abstractions::{
    Certificate, CertificateChain, CertificateParser, DerCertificateParser, SigningInfo,
    SigningService, TrustRequirement, ValidationStatus,
};
