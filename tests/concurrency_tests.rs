mod common;

use common::{issue_one, open_store, setup_store};
use wonder_key_service::models::key_record::{KeyStatus, Plan};
use wonder_key_service::services::record_preparer;
use wonder_key_service::services::redemption::{RedeemOutcome, redeem_key, verify_and_redeem};

/// N racing compare-and-sets on the same record: exactly one applies.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_cas_yields_exactly_one_winner() {
    let harness = setup_store().await;
    let key = issue_one(&harness.store, Plan::Premium).await;
    let lookup = record_preparer::lookup_id(&key);

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = harness.store.clone();
        let lookup = lookup.clone();
        handles.push(tokio::spawn(async move {
            redeem_key(&store, &lookup, &format!("user-{i}")).await.unwrap()
        }));
    }

    let mut winners = 0;
    for handle in handles {
        if handle.await.unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1, "exactly one redeemer must win");

    let record = harness.store.find_by_lookup_id(&lookup).await.unwrap().unwrap();
    assert_eq!(record.status, KeyStatus::Redeemed);
    assert!(record.redeemed_by.is_some());
    assert!(record.redeemed_at.is_some());
}

/// Full verify-then-redeem flows racing on one key: one success, everyone
/// else a conflict (or, if they verified after the winner committed, the
/// terminal `redeemed` reason). Never two successes.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_full_redemptions_never_double_spend() {
    let harness = setup_store().await;
    let key = issue_one(&harness.store, Plan::Vip).await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = harness.store.clone();
        let key = key.clone();
        let redeemer = format!("user-{i}");
        handles.push(tokio::spawn(async move {
            (
                redeemer.clone(),
                verify_and_redeem(&store, &key, &redeemer).await.unwrap(),
            )
        }));
    }

    let mut winner: Option<String> = None;
    for handle in handles {
        let (redeemer, outcome) = handle.await.unwrap();
        match outcome {
            RedeemOutcome::Redeemed { plan, .. } => {
                assert_eq!(plan, Plan::Vip);
                assert!(winner.is_none(), "two redeemers reported success");
                winner = Some(redeemer);
            }
            RedeemOutcome::Rejected(reason) => {
                assert!(
                    reason == "conflict" || reason == "redeemed",
                    "unexpected reason {reason}"
                );
            }
        }
    }
    let winner = winner.expect("one redeemer must succeed");

    let record = harness
        .store
        .find_by_lookup_id(&record_preparer::lookup_id(&key))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, KeyStatus::Redeemed);
    assert_eq!(record.redeemed_by, Some(winner));
}

/// Committed statuses survive a restart (fresh pool on the same file).
#[tokio::test]
async fn statuses_persist_across_reopen() {
    let harness = setup_store().await;

    let redeemed = issue_one(&harness.store, Plan::Premium).await;
    let redeemed_lookup = record_preparer::lookup_id(&redeemed);
    assert!(redeem_key(&harness.store, &redeemed_lookup, "user-9").await.unwrap());

    let revoked = issue_one(&harness.store, Plan::Basico).await;
    let revoked_lookup = record_preparer::lookup_id(&revoked);
    assert!(harness.store.revoke(&revoked_lookup).await.unwrap());

    let unused = issue_one(&harness.store, Plan::Vip).await;
    let unused_lookup = record_preparer::lookup_id(&unused);

    // Simulate a restart
    harness.store.pool().close().await;
    let reopened = open_store(&harness.url).await;

    let record = reopened.find_by_lookup_id(&redeemed_lookup).await.unwrap().unwrap();
    assert_eq!(record.status, KeyStatus::Redeemed);
    assert_eq!(record.redeemed_by.as_deref(), Some("user-9"));

    let record = reopened.find_by_lookup_id(&revoked_lookup).await.unwrap().unwrap();
    assert_eq!(record.status, KeyStatus::Revoked);

    let record = reopened.find_by_lookup_id(&unused_lookup).await.unwrap().unwrap();
    assert_eq!(record.status, KeyStatus::Unused);
    assert_eq!(record.plan, Plan::Vip);
}
