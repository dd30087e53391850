// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use prov_core::test_support::{coords, repo};

const A: &str = "https://example.com/a.git";
const B: &str = "https://example.com/b.git";

fn checkouts(entries: &[(&str, &str)]) -> IndexMap<RepoUrl, PathBuf> {
    entries.iter().map(|(url, path)| (repo(url), PathBuf::from(path))).collect()
}

#[test]
fn insert_merges_repositories() {
    let mut cache = CheckoutCache::new(4);
    assert!(cache.insert(&coords("g", "x"), checkouts(&[(A, "/s/1")])).is_empty());
    assert!(cache.insert(&coords("g", "x"), checkouts(&[(B, "/s/2")])).is_empty());

    assert_eq!(cache.repositories(&coords("g", "x")), vec![repo(A), repo(B)]);
}

#[test]
fn replaced_checkout_is_released() {
    let mut cache = CheckoutCache::new(4);
    cache.insert(&coords("g", "x"), checkouts(&[(A, "/s/1")]));
    let released = cache.insert(&coords("g", "x"), checkouts(&[(A, "/s/2")]));

    assert_eq!(released, vec![PathBuf::from("/s/1")]);
}

#[test]
fn least_recently_used_artifact_is_evicted() {
    let mut cache = CheckoutCache::new(2);
    cache.insert(&coords("g", "x"), checkouts(&[(A, "/s/x")]));
    cache.insert(&coords("g", "y"), checkouts(&[(A, "/s/y")]));
    cache.touch(&coords("g", "x"));

    let released = cache.insert(&coords("g", "z"), checkouts(&[(A, "/s/z")]));

    assert_eq!(released, vec![PathBuf::from("/s/y")]);
    assert_eq!(cache.artifacts(), vec![coords("g", "x"), coords("g", "z")]);
}

#[test]
fn checkouts_follow_wanted_order() {
    let mut cache = CheckoutCache::new(2);
    cache.insert(&coords("g", "x"), checkouts(&[(B, "/s/b"), (A, "/s/a")]));

    let found = cache.checkouts_for(&coords("g", "x"), &[repo(A), repo("https://example.com/c.git"), repo(B)]);

    assert_eq!(found, vec![(repo(A), PathBuf::from("/s/a")), (repo(B), PathBuf::from("/s/b"))]);
    assert!(cache.checkouts_for(&coords("g", "other"), &[repo(A)]).is_empty());
}

#[tokio::test]
async fn clear_deletes_directories() {
    let dir = tempfile::TempDir::new().unwrap();
    let checkout = dir.path().join("prov-x-1");
    std::fs::create_dir_all(&checkout).unwrap();
    let mut cache = CheckoutCache::new(2);
    cache.insert(&coords("g", "x"), [(repo(A), checkout.clone())].into_iter().collect());

    cache.clear().await;

    assert!(!checkout.exists());
    assert!(cache.artifacts().is_empty());
}

#[tokio::test]
async fn dropped_cache_deletes_directories() {
    let dir = tempfile::TempDir::new().unwrap();
    let checkout = dir.path().join("prov-x-1");
    std::fs::create_dir_all(&checkout).unwrap();
    let mut cache = CheckoutCache::new(2);
    cache.insert(&coords("g", "x"), [(repo(A), checkout.clone())].into_iter().collect());

    drop(cache);

    crate::test_helpers::eventually(|| async { !checkout.exists() }).await;
}
