//! Shared test harness: a scratch SQLite store per test and cheap Argon2
//! parameters so the suite stays fast.

#![allow(dead_code)]

use tempfile::TempDir;

use wonder_key_service::AppState;
use wonder_key_service::db;
use wonder_key_service::middleware::auth;
use wonder_key_service::models::key_record::Plan;
use wonder_key_service::services::issuance;
use wonder_key_service::services::record_preparer::HashingParams;
use wonder_key_service::store::KeyStore;

/// Issuer token used by the API tests.
pub const TEST_TOKEN: &str = "issuer-secret";

/// A store backed by a temp directory; dropping the harness deletes the file.
pub struct TestStore {
    pub store: KeyStore,
    pub url: String,
    _dir: TempDir,
}

/// Minimal Argon2 cost so hashing doesn't dominate test time.
pub fn fast_params() -> HashingParams {
    HashingParams {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    }
}

pub async fn setup_store() -> TestStore {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}", dir.path().join("keys.db").display());
    let store = open_store(&url).await;
    TestStore {
        store,
        url,
        _dir: dir,
    }
}

/// Open (or reopen) a store on an existing database file. Used by the
/// durability tests to simulate a process restart.
pub async fn open_store(url: &str) -> KeyStore {
    let pool = db::create_pool(url).await.expect("pool");
    db::run_migrations(&pool).await.expect("migrations");
    KeyStore::new(pool)
}

pub fn test_state(store: KeyStore) -> AppState {
    AppState {
        store,
        hashing: fast_params(),
        api_token_hash: auth::token_digest(TEST_TOKEN),
        notifier: None,
    }
}

/// Issue a single key and return its plaintext.
pub async fn issue_one(store: &KeyStore, plan: Plan) -> String {
    issuance::issue_keys(store, fast_params(), plan, 1)
        .await
        .expect("issue")
        .remove(0)
}
