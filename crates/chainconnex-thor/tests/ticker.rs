//! Head tracker ticker behaviour against a mining in-memory chain.

use std::sync::Arc;
use std::time::Duration;

use chainconnex_core::{HeadTrackerConfig, MemoryDriver};
use chainconnex_thor::Thor;

fn fast() -> HeadTrackerConfig {
    HeadTrackerConfig {
        poll_interval_ms: 5,
        retry_interval_ms: 5,
        sync_threshold_secs: 30,
    }
}

async fn wait_for_number(thor: &Thor, number: u32) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while thor.status().head.number < number {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("head never advanced");
}

#[tokio::test]
async fn tickers_are_independent() {
    let driver = Arc::new(MemoryDriver::new(1_000));
    let thor = Thor::new(driver.clone(), fast());

    let mut first = thor.ticker();
    let b1 = driver.mine(1_010);
    wait_for_number(&thor, 1).await;

    // Armed after block 1 was observed: must not report it.
    let mut second = thor.ticker();

    let seen = tokio::time::timeout(Duration::from_secs(2), first.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seen.id, b1.id);

    assert!(
        tokio::time::timeout(Duration::from_millis(50), second.next()).await.is_err(),
        "second ticker fired for a change that happened before it was armed"
    );

    let b2 = driver.mine(1_020);
    let seen = tokio::time::timeout(Duration::from_secs(2), second.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seen.id, b2.id);

    // The first ticker is re-armable and now sees block 2 as well.
    let seen = tokio::time::timeout(Duration::from_secs(2), first.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(seen.number, 2);
}

#[tokio::test]
async fn dropping_a_ticker_does_not_affect_others() {
    let driver = Arc::new(MemoryDriver::new(1_000));
    let thor = Thor::new(driver.clone(), fast());

    let dropped = thor.ticker();
    let mut kept = thor.ticker();
    drop(dropped);

    driver.mine(1_010);
    let head = tokio::time::timeout(Duration::from_secs(2), kept.next())
        .await
        .unwrap();
    assert_eq!(head.map(|h| h.number), Some(1));
}

#[tokio::test]
async fn ticker_ends_when_tracker_is_gone() {
    let driver = Arc::new(MemoryDriver::new(1_000));
    let thor = Thor::new(driver.clone(), fast());
    let mut ticker = thor.ticker();
    drop(thor);
    let next = tokio::time::timeout(Duration::from_secs(2), ticker.next())
        .await
        .unwrap();
    assert!(next.is_none());
}
