mod common;

use common::{issue_one, setup_store};
use wonder_key_service::models::key_record::{KeyStatus, Plan};
use wonder_key_service::services::record_preparer;
use wonder_key_service::services::redemption::{RedeemOutcome, redeem_key, verify_and_redeem};
use wonder_key_service::services::verification::{VerifyOutcome, verify_key};

#[tokio::test]
async fn redemption_stamps_redeemer_and_time_once() {
    let harness = setup_store().await;
    let key = issue_one(&harness.store, Plan::Vip).await;
    let lookup = record_preparer::lookup_id(&key);

    let outcome = verify_and_redeem(&harness.store, &key, "user-42")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        RedeemOutcome::Redeemed {
            plan: Plan::Vip,
            lookup_id: lookup.clone(),
        }
    );

    let record = harness.store.find_by_lookup_id(&lookup).await.unwrap().unwrap();
    assert_eq!(record.status, KeyStatus::Redeemed);
    assert_eq!(record.redeemed_by.as_deref(), Some("user-42"));
    let first_redeemed_at = record.redeemed_at.expect("redeemed_at set");

    // A later attempt must neither succeed nor restamp the metadata
    assert!(!redeem_key(&harness.store, &lookup, "user-43").await.unwrap());
    let record = harness.store.find_by_lookup_id(&lookup).await.unwrap().unwrap();
    assert_eq!(record.redeemed_by.as_deref(), Some("user-42"));
    assert_eq!(record.redeemed_at, Some(first_redeemed_at));
}

#[tokio::test]
async fn redeemed_key_fails_subsequent_verify_and_redeem() {
    let harness = setup_store().await;
    let key = issue_one(&harness.store, Plan::Premium).await;

    assert!(matches!(
        verify_and_redeem(&harness.store, &key, "u1").await.unwrap(),
        RedeemOutcome::Redeemed { .. }
    ));

    assert_eq!(
        verify_key(&harness.store, &key).await.unwrap(),
        VerifyOutcome::Redeemed
    );
    assert_eq!(
        verify_and_redeem(&harness.store, &key, "u2").await.unwrap(),
        RedeemOutcome::Rejected("redeemed")
    );
}

#[tokio::test]
async fn revoked_key_never_redeems() {
    let harness = setup_store().await;
    let key = issue_one(&harness.store, Plan::Basico).await;
    let lookup = record_preparer::lookup_id(&key);

    assert!(harness.store.revoke(&lookup).await.unwrap());

    assert_eq!(
        verify_and_redeem(&harness.store, &key, "u1").await.unwrap(),
        RedeemOutcome::Rejected("revoked")
    );
    assert!(!redeem_key(&harness.store, &lookup, "u1").await.unwrap());

    let record = harness.store.find_by_lookup_id(&lookup).await.unwrap().unwrap();
    assert_eq!(record.status, KeyStatus::Revoked);
}

#[tokio::test]
async fn revoke_is_a_no_op_on_terminal_records() {
    let harness = setup_store().await;

    let redeemed = issue_one(&harness.store, Plan::Premium).await;
    let redeemed_lookup = record_preparer::lookup_id(&redeemed);
    assert!(redeem_key(&harness.store, &redeemed_lookup, "u1").await.unwrap());

    // Redeemed keys stay redeemed
    assert!(!harness.store.revoke(&redeemed_lookup).await.unwrap());
    let record = harness
        .store
        .find_by_lookup_id(&redeemed_lookup)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.status, KeyStatus::Redeemed);

    // Revoking twice: second call reports false
    let revoked = issue_one(&harness.store, Plan::Premium).await;
    let revoked_lookup = record_preparer::lookup_id(&revoked);
    assert!(harness.store.revoke(&revoked_lookup).await.unwrap());
    assert!(!harness.store.revoke(&revoked_lookup).await.unwrap());

    // Absent records report false as well
    assert!(!harness.store.revoke("0000000000000000").await.unwrap());
}

#[tokio::test]
async fn losing_the_verify_to_redeem_window_is_a_conflict() {
    let harness = setup_store().await;
    let key = issue_one(&harness.store, Plan::Vip).await;

    // Simulate the race: this caller verified while the key was unused...
    let VerifyOutcome::Valid { lookup_id, .. } = verify_key(&harness.store, &key).await.unwrap()
    else {
        panic!("expected valid outcome");
    };

    // ...but another caller redeems before it does
    assert!(redeem_key(&harness.store, &lookup_id, "winner").await.unwrap());

    // The stale lookup_id now loses the CAS
    assert!(!redeem_key(&harness.store, &lookup_id, "loser").await.unwrap());
}
