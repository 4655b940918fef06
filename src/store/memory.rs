//! In-memory store used by the binary and by tests.
//!
//! Records live in a `tokio::sync::Mutex`. Failures can be queued with
//! [`MemoryBills::fail_next_list`], [`MemoryBills::fail_next_create`] and
//! [`MemoryBills::fail_next_delete`], and every create payload and deletion is
//! recorded for inspection.

use super::{BillsResource, CreatePayload, CreatedBill, PayloadData, Store};
use crate::{
    entities::Bill,
    errors::{Error, Result},
};
use async_trait::async_trait;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

const DEFAULT_FILE_HOST: &str = "https://files.test";

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bills: MemoryBills,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `bills`, listed in the given order.
    #[must_use]
    pub fn with_bills(bills: Vec<Bill>) -> Self {
        Self {
            bills: MemoryBills::with_records(bills),
        }
    }

    /// Loads a JSON array of bills from `path`.
    pub fn from_fixture_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        debug!("Loading bill fixtures from: {:?}", path_ref);
        let contents = std::fs::read_to_string(path_ref)?;
        let bills: Vec<Bill> = serde_json::from_str(&contents)?;
        info!("Loaded {} bill fixtures from {:?}", bills.len(), path_ref);
        Ok(Self::with_bills(bills))
    }

    /// Concrete resource, for failure injection and inspection.
    #[must_use]
    pub const fn bills_resource(&self) -> &MemoryBills {
        &self.bills
    }
}

impl Store for MemoryStore {
    fn bills(&self) -> &dyn BillsResource {
        &self.bills
    }
}

/// Uploaded file held by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredUpload {
    pub file_name: String,
    pub file_url: String,
    /// `email` part sent with the file
    pub email: Option<String>,
    /// Size in bytes
    pub size: usize,
}

#[derive(Debug, Default)]
struct Inner {
    records: Vec<Bill>,
    uploads: BTreeMap<String, StoredUpload>,
    next_key: u64,
    create_calls: Vec<CreatePayload>,
    deleted: Vec<String>,
    list_calls: usize,
    list_failures: VecDeque<String>,
    create_failures: VecDeque<String>,
    delete_failures: VecDeque<String>,
    uploads_without_url: usize,
}

impl Inner {
    fn allocate_key(&mut self) -> String {
        self.next_key += 1;
        format!("bill-{}", self.next_key)
    }
}

/// Bill resource of [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryBills {
    inner: Mutex<Inner>,
    file_host: String,
}

impl Default for MemoryBills {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            file_host: DEFAULT_FILE_HOST.to_string(),
        }
    }
}

impl MemoryBills {
    fn with_records(records: Vec<Bill>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                records,
                ..Inner::default()
            }),
            file_host: DEFAULT_FILE_HOST.to_string(),
        }
    }

    /// Makes the next `list` call fail with `message`.
    pub async fn fail_next_list(&self, message: impl Into<String>) {
        self.inner.lock().await.list_failures.push_back(message.into());
    }

    /// Makes the next `create` call fail with `message`.
    pub async fn fail_next_create(&self, message: impl Into<String>) {
        self.inner
            .lock()
            .await
            .create_failures
            .push_back(message.into());
    }

    /// Makes the next `delete` call fail with `message`.
    pub async fn fail_next_delete(&self, message: impl Into<String>) {
        self.inner
            .lock()
            .await
            .delete_failures
            .push_back(message.into());
    }

    /// Stores the next upload but answers without its file URL.
    pub async fn omit_next_file_url(&self) {
        self.inner.lock().await.uploads_without_url += 1;
    }

    /// Every payload passed to `create`, failed calls included.
    pub async fn create_calls(&self) -> Vec<CreatePayload> {
        self.inner.lock().await.create_calls.clone()
    }

    /// Keys removed through `delete`.
    pub async fn deleted_keys(&self) -> Vec<String> {
        self.inner.lock().await.deleted.clone()
    }

    /// Number of `list` calls so far.
    pub async fn list_calls(&self) -> usize {
        self.inner.lock().await.list_calls
    }

    /// Bills created or seeded so far.
    pub async fn records(&self) -> Vec<Bill> {
        self.inner.lock().await.records.clone()
    }

    /// Upload stored under `key`, if still present.
    pub async fn upload(&self, key: &str) -> Option<StoredUpload> {
        self.inner.lock().await.uploads.get(key).cloned()
    }
}

#[async_trait]
impl BillsResource for MemoryBills {
    async fn list(&self) -> Result<Vec<Bill>> {
        let mut inner = self.inner.lock().await;
        inner.list_calls += 1;
        if let Some(message) = inner.list_failures.pop_front() {
            return Err(Error::transport(message));
        }
        Ok(inner.records.clone())
    }

    async fn create(&self, payload: CreatePayload) -> Result<CreatedBill> {
        let mut inner = self.inner.lock().await;
        inner.create_calls.push(payload.clone());
        if let Some(message) = inner.create_failures.pop_front() {
            return Err(Error::transport(message));
        }

        match payload.data {
            PayloadData::Multipart(form) => {
                let file = form
                    .get_file("file")
                    .ok_or_else(|| Error::transport("Erreur 400: missing file part"))?;
                let key = inner.allocate_key();
                let file_url = format!("{}/{}/{}", self.file_host, key, file.name);
                inner.uploads.insert(
                    key.clone(),
                    StoredUpload {
                        file_name: file.name.clone(),
                        file_url: file_url.clone(),
                        email: form.get_text("email").map(str::to_string),
                        size: file.bytes.len(),
                    },
                );
                debug!(%key, %file_url, "stored upload");
                let file_url = if inner.uploads_without_url > 0 {
                    inner.uploads_without_url -= 1;
                    None
                } else {
                    Some(file_url)
                };
                Ok(CreatedBill { file_url, key })
            }
            PayloadData::Json(body) => {
                let mut bill: Bill = serde_json::from_str(&body)
                    .map_err(|e| Error::transport(format!("Erreur 400: {e}")))?;
                let key = inner.allocate_key();
                bill.id = Some(key.clone());
                let file_url = bill.file_url.clone();
                inner.records.push(bill);
                debug!(%key, "stored bill");
                Ok(CreatedBill { file_url, key })
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if let Some(message) = inner.delete_failures.pop_front() {
            return Err(Error::transport(message));
        }
        let removed_upload = inner.uploads.remove(key).is_some();
        let before = inner.records.len();
        inner.records.retain(|bill| bill.id.as_deref() != Some(key));
        if !removed_upload && inner.records.len() == before {
            return Err(Error::transport("Erreur 404"));
        }
        inner.deleted.push(key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::store::{MultipartForm, UploadFile};
    use crate::test_utils::fixture_bills;

    #[tokio::test]
    async fn test_list_returns_seeded_bills_in_order() -> Result<()> {
        let store = MemoryStore::with_bills(fixture_bills());
        let bills = store.bills().list().await?;
        let dates: Vec<&str> = bills.iter().map(|b| b.date.as_str()).collect();
        assert_eq!(dates, ["2004-04-04", "2001-01-01", "2003-03-03", "2002-02-02"]);
        assert_eq!(store.bills_resource().list_calls().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_injected_list_failure_is_consumed_once() -> Result<()> {
        let store = MemoryStore::new();
        store.bills_resource().fail_next_list("Erreur 500").await;

        let err = store.bills().list().await.unwrap_err();
        assert_eq!(err.to_string(), "Erreur 500");
        assert!(store.bills().list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_upload_then_delete() -> Result<()> {
        let store = MemoryStore::new();
        let form = MultipartForm::new()
            .file("file", UploadFile::new("receipt.jpg", "image/jpeg", vec![1, 2, 3]))
            .text("email", "a@a");

        let created = store.bills().create(CreatePayload::multipart(form)).await?;
        assert_eq!(created.key, "bill-1");
        assert_eq!(
            created.file_url.as_deref(),
            Some("https://files.test/bill-1/receipt.jpg")
        );
        let upload = store.bills_resource().upload("bill-1").await.unwrap();
        assert_eq!(upload.email.as_deref(), Some("a@a"));
        assert_eq!(upload.size, 3);

        store.bills().delete("bill-1").await?;
        assert!(store.bills_resource().upload("bill-1").await.is_none());
        assert_eq!(store.bills_resource().deleted_keys().await, ["bill-1"]);

        let missing = store.bills().delete("bill-1").await.unwrap_err();
        assert_eq!(missing.to_string(), "Erreur 404");
        Ok(())
    }

    #[tokio::test]
    async fn test_injected_delete_failure_keeps_the_upload() -> Result<()> {
        let store = MemoryStore::new();
        store.bills_resource().omit_next_file_url().await;
        let form = MultipartForm::new().file("file", UploadFile::new("a.png", "image/png", vec![0]));

        let created = store.bills().create(CreatePayload::multipart(form)).await?;
        assert!(created.file_url.is_none());
        assert!(store.bills_resource().upload(&created.key).await.is_some());

        store.bills_resource().fail_next_delete("Erreur 503").await;
        let err = store.bills().delete(&created.key).await.unwrap_err();
        assert_eq!(err.to_string(), "Erreur 503");
        assert!(store.bills_resource().deleted_keys().await.is_empty());

        store.bills().delete(&created.key).await?;
        assert_eq!(store.bills_resource().deleted_keys().await, [created.key]);
        Ok(())
    }

    #[tokio::test]
    async fn test_json_create_assigns_key() -> Result<()> {
        let store = MemoryStore::new();
        let mut bill = fixture_bills().remove(0);
        bill.id = None;
        let body = serde_json::to_string(&bill)?;

        let created = store.bills().create(CreatePayload::json(body)).await?;
        let records = store.bills_resource().records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some(created.key.as_str()));
        assert_eq!(created.file_url, bill.file_url);
        Ok(())
    }

    #[tokio::test]
    async fn test_multipart_without_file_is_rejected() {
        let store = MemoryStore::new();
        let form = MultipartForm::new().text("email", "a@a");
        let err = store
            .bills()
            .create(CreatePayload::multipart(form))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
