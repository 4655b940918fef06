//! Shared test utilities for the bill containers.
//!
//! This module provides the fixture bills, a harness wiring the containers to
//! an in-memory store with recording doubles, and sample files and forms.

use crate::{
    config::AppConfig,
    context::ContainerContext,
    core::form::{NewBillForm, StagedUpload},
    diagnostics::RecordingDiagnostics,
    entities::Bill,
    routes::RecordingNavigator,
    session::{MemoryStorage, StorageSession, USER_KEY},
    store::{MemoryStore, UploadFile},
};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const FIXTURE_BILLS: &str = include_str!("../fixtures/bills.json");

/// Routes test logs through the test writer so they show up on failure.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// The four bills of `fixtures/bills.json`, dated 2004, 2001, 2003 and 2002 in that order.
#[allow(clippy::expect_used)]
pub fn fixture_bills() -> Vec<Bill> {
    serde_json::from_str(FIXTURE_BILLS).expect("fixture bills must parse")
}

/// Containers' context plus handles on the concrete doubles behind it.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub diagnostics: Arc<RecordingDiagnostics>,
    pub context: ContainerContext,
}

/// Employee `a@a` with the fixture bills and the default configuration.
pub fn setup_harness() -> Harness {
    setup_harness_with(fixture_bills(), AppConfig::default())
}

/// Employee `a@a` with custom bills and configuration.
pub fn setup_harness_with(bills: Vec<Bill>, config: AppConfig) -> Harness {
    // The user record is stored double-encoded, as the login screen writes it.
    let record = serde_json::json!({ "type": "Employee", "email": "a@a" }).to_string();
    let encoded = serde_json::Value::String(record).to_string();
    build_harness(bills, config, Some(&encoded))
}

/// Harness whose session holds the raw `user` record given.
pub fn setup_harness_with_user(raw_user: &str) -> Harness {
    build_harness(fixture_bills(), AppConfig::default(), Some(raw_user))
}

/// Harness with nobody connected.
pub fn setup_harness_without_session() -> Harness {
    build_harness(fixture_bills(), AppConfig::default(), None)
}

fn build_harness(bills: Vec<Bill>, config: AppConfig, raw_user: Option<&str>) -> Harness {
    init_test_tracing();
    let storage = MemoryStorage::new();
    if let Some(raw_user) = raw_user {
        storage.set_item(USER_KEY, raw_user);
    }

    let store = Arc::new(MemoryStore::with_bills(bills));
    let navigator = Arc::new(RecordingNavigator::new());
    let diagnostics = Arc::new(RecordingDiagnostics::new());
    let context = ContainerContext::new(
        Arc::clone(&store) as _,
        Arc::new(StorageSession::new(storage)),
        Arc::clone(&navigator) as _,
        Arc::clone(&diagnostics) as _,
        Arc::new(config),
    );

    Harness {
        store,
        navigator,
        diagnostics,
        context,
    }
}

/// `test.png`, `image/png`.
pub fn png_file() -> UploadFile {
    UploadFile::new("test.png", "image/png", b"image content".to_vec())
}

/// `test.txt`, `text/plain`.
pub fn text_file() -> UploadFile {
    UploadFile::new("test.txt", "text/plain", b"file content".to_vec())
}

/// A complete, valid new-bill form.
pub fn valid_form() -> NewBillForm {
    NewBillForm {
        expense_type: "Transports".to_string(),
        expense_name: "Vol Paris Londres".to_string(),
        amount: "348".to_string(),
        date: "2022-04-12".to_string(),
        vat: "70".to_string(),
        pct: "20".to_string(),
        commentary: String::new(),
    }
}

/// Upload as staged after the first successful upload of [`png_file`].
pub fn staged_upload() -> StagedUpload {
    StagedUpload {
        file_url: "https://files.test/bill-1/test.png".to_string(),
        file_name: "test.png".to_string(),
        key: "bill-1".to_string(),
    }
}
