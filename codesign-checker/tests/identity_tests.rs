// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Signer identity and team-equivalence comparisons.

use std::sync::Arc;

use codesign_abstractions::{Certificate, CertificateParser};
use codesign_checker::CodeReference;
use codesign_test_utils::{test_certificate_der, FakeBinary, FakeSigningService};

fn acme_pair_service() -> Arc<FakeSigningService> {
    // Two builds signed by the same team ("Acme Corp", unit "T1") but with
    // different chains, e.g. the second one re-signed after a rebuild.
    let first = test_certificate_der("Acme Corp", "T1", "Acme Tool");
    let second = test_certificate_der("Acme Corp", "T1", "Acme Tool");

    Arc::new(
        FakeSigningService::new()
            .with_binary_at("/bin/a", FakeBinary::signed(vec![first]).anchored_generic())
            .with_binary_at("/bin/b", FakeBinary::signed(vec![second]).anchored_generic()),
    )
}

#[test]
fn chain_match_is_reflexive() {
    let service = acme_pair_service();
    let a = CodeReference::from_path(service.clone(), "/bin/a").unwrap();
    let a_again = CodeReference::from_path(service, "/bin/a").unwrap();

    assert!(a.signing_chain_matches(&a));
    assert!(a.signing_chain_matches(&a_again));
}

#[test]
fn chain_match_is_symmetric() {
    let service = acme_pair_service();
    let a = CodeReference::from_path(service.clone(), "/bin/a").unwrap();
    let b = CodeReference::from_path(service, "/bin/b").unwrap();

    assert_eq!(a.signing_chain_matches(&b), b.signing_chain_matches(&a));
}

#[test]
fn rebuilt_team_binaries_match_by_team_but_not_by_chain() {
    let service = acme_pair_service();
    let a = CodeReference::from_path(service.clone(), "/bin/a").unwrap();
    let b = CodeReference::from_path(service, "/bin/b").unwrap();

    assert!(!a.signing_chain_matches(&b));
    assert!(a.team_signing_matches(&b));
    assert!(b.team_signing_matches(&a));
}

#[test]
fn team_match_requires_both_anchor_validations() {
    let matching = test_certificate_der("Acme Corp", "T1", "Acme Tool");
    let matching_too = test_certificate_der("Acme Corp", "T1", "Acme Tool");

    // Same org unit on both leaves, but only one side proves platform anchor.
    let service = Arc::new(
        FakeSigningService::new()
            .with_binary_at("/bin/a", FakeBinary::signed(vec![matching]).anchored_generic())
            .with_binary_at("/bin/b", FakeBinary::signed(vec![matching_too])),
    );

    let a = CodeReference::from_path(service.clone(), "/bin/a").unwrap();
    let b = CodeReference::from_path(service, "/bin/b").unwrap();

    assert!(!a.team_signing_matches(&b));
    assert!(!b.team_signing_matches(&a));
}

#[test]
fn team_match_is_false_for_unsigned_references() {
    let leaf = test_certificate_der("Acme Corp", "T1", "Acme Tool");
    let service = Arc::new(
        FakeSigningService::new()
            .with_binary_at("/bin/signed", FakeBinary::signed(vec![leaf]).anchored_generic())
            // Even a scripted anchor pass cannot rescue an empty chain.
            .with_binary_at("/bin/unsigned", FakeBinary::unsigned().anchored_generic()),
    );

    let signed = CodeReference::from_path(service.clone(), "/bin/signed").unwrap();
    let unsigned = CodeReference::from_path(service, "/bin/unsigned").unwrap();

    assert!(!signed.team_signing_matches(&unsigned));
    assert!(!unsigned.team_signing_matches(&signed));
    assert!(!unsigned.team_signing_matches(&unsigned));
}

// Parser that strips the organizational unit, regardless of input.
struct UnitlessParser;

impl CertificateParser for UnitlessParser {
    fn wrap_certificate(&self, raw: &[u8]) -> Option<Certificate> {
        let mut fingerprint = [0u8; 32];
        fingerprint[..raw.len().min(32)].copy_from_slice(&raw[..raw.len().min(32)]);
        Some(Certificate::new(
            fingerprint,
            Some("Acme Corp".into()),
            None,
            None,
        ))
    }
}

#[test]
fn team_match_is_false_without_organizational_units() {
    let service = Arc::new(
        FakeSigningService::new()
            .with_binary_at("/bin/a", FakeBinary::signed(vec![vec![1; 32]]).anchored_generic())
            .with_binary_at("/bin/b", FakeBinary::signed(vec![vec![2; 32]]).anchored_generic()),
    );

    let a = CodeReference::from_path(service.clone(), "/bin/a")
        .unwrap()
        .with_certificate_parser(Arc::new(UnitlessParser));
    let b = CodeReference::from_path(service, "/bin/b")
        .unwrap()
        .with_certificate_parser(Arc::new(UnitlessParser));

    // Leaves exist on both sides, but neither carries a unit to match on.
    assert!(a.leaf_certificate().is_some());
    assert!(!a.team_signing_matches(&b));
}
