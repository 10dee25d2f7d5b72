//! `chainconnex simulate`: drive `Thor` and `Vendor` against a mining in-memory chain.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use chainconnex_core::{ClauseInput, MemoryDriver, SigningPolicy};
use chainconnex_thor::Thor;
use chainconnex_vendor::Vendor;

use crate::config::ConnexConfig;

const WALLET: &str = "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed";

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub async fn run(config: &ConnexConfig, blocks: u32, interval_ms: u64) -> Result<()> {
    // Genesis an hour in the past so progress starts below 1.0.
    let driver = Arc::new(MemoryDriver::new(unix_now().saturating_sub(3_600)));
    driver.set_owned(vec![WALLET.to_uppercase().replacen("0X", "0x", 1)]);
    driver.set_signing_policy(SigningPolicy::Approve {
        signer: WALLET.into(),
    });

    let thor = Thor::new(driver.clone(), config.head_tracker.clone());
    let vendor = Vendor::new(driver.clone(), config.owned_addresses.clone());
    println!("Genesis: {} (#{})", thor.genesis().id, thor.genesis().number);

    let miner = {
        let driver = driver.clone();
        tokio::spawn(async move {
            for _ in 0..blocks {
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                let block = driver.mine(unix_now());
                tracing::debug!(number = block.number, "Mined block");
            }
        })
    };

    let mut ticker = thor.ticker();
    let mut seen = 0;
    while seen < blocks {
        let Some(head) = ticker.next().await else {
            break;
        };
        seen = head.number;
        println!(
            "Head #{:<4} {}  progress {:.2}",
            head.number,
            head.id,
            thor.status().progress
        );
    }
    miner.await.context("miner task")?;

    println!("Wallet owns {WALLET}: {}", vendor.owned(WALLET)?);
    let signed = vendor
        .sign_tx()
        .comment("simulated transfer")
        .request(vec![ClauseInput::new().to(WALLET).value("0x10")])?
        .await?;
    println!("Signed tx {} by {}", signed.txid, signed.signer);
    Ok(())
}
