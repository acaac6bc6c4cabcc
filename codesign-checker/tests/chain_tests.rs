// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate chain derivation from signing metadata.

use std::sync::Arc;

use codesign_checker::CodeReference;
use codesign_test_utils::{test_certificate_der, FakeBinary, FakeSigningService};

#[test]
fn signed_binary_yields_a_leaf_first_chain() {
    let leaf = test_certificate_der("Acme Corp", "T1", "Acme Tool");
    let intermediate = test_certificate_der("Example CA", "Issuing", "Example Issuing CA");
    let service = Arc::new(FakeSigningService::new().with_binary_at(
        "/bin/tool",
        FakeBinary::signed(vec![leaf, intermediate]),
    ));

    let reference = CodeReference::from_path(service, "/bin/tool").unwrap();
    let chain = reference.certificates();

    assert_eq!(chain.len(), 2);
    let leaf_cert = reference.leaf_certificate().unwrap();
    assert_eq!(leaf_cert, chain.leaf().unwrap());
    assert_eq!(leaf_cert.org_name(), Some("Acme Corp"));
    assert_eq!(leaf_cert.org_unit(), Some("T1"));
    assert_eq!(chain.iter().nth(1).unwrap().org_name(), Some("Example CA"));
}

#[test]
fn unsigned_binary_yields_an_empty_chain() {
    let service = Arc::new(
        FakeSigningService::new().with_binary_at("/bin/tool", FakeBinary::unsigned()),
    );

    let reference = CodeReference::from_path(service, "/bin/tool").unwrap();
    assert!(reference.certificates().is_empty());
    assert!(reference.leaf_certificate().is_none());
}

#[test]
fn malformed_entries_shorten_the_chain_without_failing() {
    let leaf = test_certificate_der("Acme Corp", "T1", "Acme Tool");
    let intermediate = test_certificate_der("Example CA", "Issuing", "Example Issuing CA");
    let service = Arc::new(FakeSigningService::new().with_binary_at(
        "/bin/tool",
        FakeBinary::signed(vec![leaf, b"not a certificate".to_vec(), intermediate]),
    ));

    let reference = CodeReference::from_path(service, "/bin/tool").unwrap();
    let chain = reference.certificates();

    assert_eq!(chain.len(), 2);
    assert_eq!(chain.leaf().unwrap().org_name(), Some("Acme Corp"));
}

#[test]
fn chain_is_derived_once_per_reference() {
    let leaf = test_certificate_der("Acme Corp", "T1", "Acme Tool");
    let service = Arc::new(
        FakeSigningService::new().with_binary_at("/bin/tool", FakeBinary::signed(vec![leaf])),
    );

    let reference = CodeReference::from_path(service.clone(), "/bin/tool").unwrap();
    let first = reference.certificates();
    let second = reference.certificates();

    assert!(std::ptr::eq(first, second));
    // The chain derives from the memoized snapshot; one platform query total.
    assert_eq!(service.signing_info_queries(), 1);
}
