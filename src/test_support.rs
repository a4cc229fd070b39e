//! Shared fixtures for in-crate tests.

use axum::response::Response;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::{AdminAccount, AppConfig};
use crate::content::FileContentStore;
use crate::records::MemoryRecordStore;
use crate::session::SessionCodec;
use crate::AppState;

pub const TEST_SECRET: &str = "site-write-secret";
pub const TEST_ADMIN: &str = "ops@firm.example";
pub const TEST_PASSWORD: &str = "correct horse battery";

/// State backed by a temporary content directory and in-memory records.
/// Keep the returned directory alive for the duration of the test.
pub fn test_state(secret: Option<&str>) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let password_hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    let config = AppConfig {
        content_dir: dir.path().to_path_buf(),
        content_api_secret: secret.map(str::to_string),
        admin_accounts: vec![AdminAccount {
            email: TEST_ADMIN.to_string(),
            password_hash,
        }],
        ..AppConfig::default()
    };
    let state = AppState {
        sessions: SessionCodec::new(config.admin_emails()),
        content: Arc::new(FileContentStore::new(dir.path())),
        records: Arc::new(MemoryRecordStore::new()),
        config: Arc::new(config),
    };
    (state, dir)
}

pub async fn read_json<T: DeserializeOwned>(res: Response) -> T {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
