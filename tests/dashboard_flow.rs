use std::sync::Arc;
use std::time::Duration;

use aquachain::cli::{Panel, PanelAccess};
use aquachain::telemetry::{follow_session, FeedConfig, SensorFeed, SharedBillBook};
use aquachain::wallet::{IdentityRole, MemoryStore, WalletConfig};
use aquachain::{Roster, SessionStore, ViewerRole};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn store() -> SessionStore<MemoryStore> {
    SessionStore::with_parts(
        MemoryStore::new(),
        Arc::new(Roster::builtin()),
        WalletConfig::default(),
        StdRng::seed_from_u64(99),
    )
}

async fn wait_for_bills(book: &SharedBillBook, expected: usize) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while book.lock().bills().len() != expected {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("bill book never caught up with the session");
}

#[test_log::test(tokio::test)]
async fn bill_book_follows_identity_switches() {
    let mut store = store();
    let (book, follower) = follow_session(store.subscribe(), Arc::clone(store.roster()));
    assert!(book.lock().bills().is_empty());

    store.connect_default().unwrap();
    wait_for_bills(&book, 3).await;
    assert!(book.lock().bills().iter().all(|b| b.user_id == "user-001"));

    store.switch_identity("admin-001").unwrap();
    wait_for_bills(&book, 30).await;

    store.switch_to_public();
    wait_for_bills(&book, 0).await;

    drop(store);
    tokio::time::timeout(Duration::from_secs(1), follower)
        .await
        .expect("follower should stop with the store")
        .unwrap();
}

#[test_log::test]
fn panel_access_tracks_every_identity() {
    let mut store = store();
    let ids: Vec<String> = store.all_identities().iter().map(|i| i.id.clone()).collect();

    for id in ids {
        let identity = store.switch_identity(&id).unwrap();
        let analytics = Panel::Analytics.access(store.viewer_role());
        match identity.role {
            IdentityRole::Admin => assert_eq!(analytics, PanelAccess::Visible, "{id}"),
            IdentityRole::User => assert_eq!(analytics, PanelAccess::Restricted, "{id}"),
        }
        assert_eq!(Panel::Overview.access(store.viewer_role()), PanelAccess::Hidden);
    }

    store.disconnect();
    assert_eq!(store.viewer_role(), ViewerRole::Public);
    assert_eq!(Panel::Sensors.access(store.viewer_role()), PanelAccess::Hidden);
    assert_eq!(Panel::Billing.access(store.viewer_role()), PanelAccess::Visible);
}

#[tokio::test(start_paused = true)]
async fn first_anchor_lands_one_interval_after_start() {
    let config = FeedConfig::default();
    let mut feed = SensorFeed::start_with_rng(&config, StdRng::seed_from_u64(5));
    let summary = feed.summary();
    assert_eq!(summary.sensor_count, 4);

    tokio::time::sleep(Duration::from_millis(2_999)).await;
    assert!(feed.transactions().is_empty());

    tokio::time::sleep(Duration::from_millis(2)).await;
    let anchored = feed.transactions();
    assert_eq!(anchored.len(), 4);
    let readings = feed.readings();
    for (tx, reading) in anchored.iter().zip(&readings) {
        assert_eq!(tx.sensor_id, reading.id);
    }

    feed.stop().await;
    assert!(!feed.is_running());
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(feed.transactions().len(), 4);
}
