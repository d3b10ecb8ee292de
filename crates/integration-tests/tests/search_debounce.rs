//! Debounced search end to end, on the real clock.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use qkart_integration_tests::{MockBackend, routes};
use qkart_storefront::services::Listing;
use qkart_storefront::{MemorySessionStore, Storefront};
use tokio::sync::mpsc;

#[tokio::test]
async fn test_typing_burst_sends_one_search() {
    let backend = MockBackend::spawn().await;
    let mut storefront =
        Storefront::new(backend.config(), Arc::new(MemorySessionStore::new())).unwrap();
    storefront.refresh_catalog().await.unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut debouncer = storefront.search_debouncer(tx);
    let delay = storefront.search_delay();

    for text in ["w", "wa", "wat", "watc", "watch"] {
        debouncer.call(text, delay);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let response = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.text, "watch");

    storefront.apply_search(response).unwrap();
    assert_eq!(storefront.catalog().listing(), Listing::Products);
    assert_eq!(storefront.catalog().displayed().len(), 1);

    // Nothing else is on its way
    tokio::time::sleep(delay * 3).await;
    assert!(rx.try_recv().is_err());
    assert_eq!(backend.hits(routes::SEARCH), 1);
}

#[tokio::test]
async fn test_dropped_debouncer_sends_nothing() {
    let backend = MockBackend::spawn().await;
    let storefront =
        Storefront::new(backend.config(), Arc::new(MemorySessionStore::new())).unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut debouncer = storefront.search_debouncer(tx);
    debouncer.call("watch", storefront.search_delay());
    drop(debouncer);

    tokio::time::sleep(storefront.search_delay() * 3).await;
    assert!(rx.recv().await.is_none());
    assert_eq!(backend.hits(routes::SEARCH), 0);
}
