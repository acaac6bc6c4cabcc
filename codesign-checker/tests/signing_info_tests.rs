// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Memoization guarantees for the signing-info snapshot.

use std::sync::Arc;

use codesign_abstractions::{SigningInfo, SigningInfoValue, KEY_IDENTIFIER};
use codesign_checker::CodeReference;
use codesign_test_utils::{FakeBinary, FakeSigningService};

fn identified(identifier: &str) -> SigningInfo {
    SigningInfo::new().with(KEY_IDENTIFIER, SigningInfoValue::Text(identifier.into()))
}

#[test]
fn signing_info_is_computed_exactly_once() {
    let service = Arc::new(FakeSigningService::new().with_binary_at(
        "/bin/tool",
        FakeBinary::unsigned().with_signing_info(identified("com.acme.tool")),
    ));

    let reference = CodeReference::from_path(service.clone(), "/bin/tool").unwrap();
    assert_eq!(service.signing_info_queries(), 0);

    let first = reference.signing_info();
    let second = reference.signing_info();

    // Same cached value, not merely an equal one.
    assert!(std::ptr::eq(first, second));
    assert_eq!(first, &identified("com.acme.tool"));
    assert_eq!(service.signing_info_queries(), 1);
}

#[test]
fn concurrent_first_access_performs_one_query() {
    let service = Arc::new(FakeSigningService::new().with_binary_at(
        "/bin/tool",
        FakeBinary::unsigned().with_signing_info(identified("com.acme.tool")),
    ));
    let reference = CodeReference::from_path(service.clone(), "/bin/tool").unwrap();

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                assert_eq!(reference.signing_info(), &identified("com.acme.tool"));
            });
        }
    });

    assert_eq!(service.signing_info_queries(), 1);
}

#[test]
fn unreadable_signing_info_memoizes_the_empty_snapshot() {
    let service = Arc::new(FakeSigningService::new().with_binary_at(
        "/bin/tool",
        FakeBinary::unsigned().with_unreadable_signing_info(),
    ));
    let reference = CodeReference::from_path(service.clone(), "/bin/tool").unwrap();

    assert!(reference.signing_info().is_empty());
    assert!(reference.signing_info().is_empty());
    // The failed query is not retried; the snapshot stands.
    assert_eq!(service.signing_info_queries(), 1);
}

#[test]
fn each_reference_has_its_own_snapshot() {
    let service = Arc::new(FakeSigningService::new().with_binary_at(
        "/bin/tool",
        FakeBinary::unsigned().with_signing_info(identified("com.acme.tool")),
    ));

    let a = CodeReference::from_path(service.clone(), "/bin/tool").unwrap();
    let b = CodeReference::from_path(service.clone(), "/bin/tool").unwrap();

    assert_eq!(a.signing_info(), b.signing_info());
    assert_eq!(service.signing_info_queries(), 2);
}

#[test]
fn binary_path_is_a_live_uncached_query() {
    let service = Arc::new(FakeSigningService::new().with_binary_at(
        "/bin/tool",
        FakeBinary::unsigned().with_path("/bin/tool"),
    ));
    let reference = CodeReference::from_path(service.clone(), "/bin/tool").unwrap();

    assert_eq!(reference.binary_path().unwrap(), std::path::Path::new("/bin/tool"));
    assert_eq!(reference.binary_path().unwrap(), std::path::Path::new("/bin/tool"));
    assert_eq!(service.path_queries(), 2);
}
