//! Store contract - The boundary between the containers and the remote bill API.
//!
//! Containers only ever see [`Store`] and [`BillsResource`]. A network client,
//! the bundled [`memory::MemoryStore`] or any test double can sit behind them.

pub mod memory;

use crate::{entities::Bill, errors::Result};
use async_trait::async_trait;

pub use memory::MemoryStore;

/// Entry point of the remote API.
pub trait Store: Send + Sync {
    /// Resource accessor for bills.
    fn bills(&self) -> &dyn BillsResource;
}

/// Bill operations exposed by the store. Every call may hit the network.
#[async_trait]
pub trait BillsResource: Send + Sync {
    /// Lists every bill visible to the current session.
    async fn list(&self) -> Result<Vec<Bill>>;

    /// Creates a record from either a multipart file upload or a JSON bill.
    async fn create(&self, payload: CreatePayload) -> Result<CreatedBill>;

    /// Removes the record stored under `key`.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Response of a successful `create`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatedBill {
    /// Public location of the uploaded file, when the record carries one
    pub file_url: Option<String>,
    /// Store key of the new record
    pub key: String,
}

/// Body and headers of a `create` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreatePayload {
    pub data: PayloadData,
    pub headers: RequestHeaders,
}

impl CreatePayload {
    /// Multipart upload; the transport picks the content type and boundary.
    #[must_use]
    pub fn multipart(form: MultipartForm) -> Self {
        Self {
            data: PayloadData::Multipart(form),
            headers: RequestHeaders::no_content_type(),
        }
    }

    /// JSON document sent as `application/json`.
    #[must_use]
    pub fn json(body: String) -> Self {
        Self {
            data: PayloadData::Json(body),
            headers: RequestHeaders::json(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadData {
    Multipart(MultipartForm),
    Json(String),
}

/// Request header hints passed to the transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    no_content_type: bool,
    content_type: Option<String>,
}

impl RequestHeaders {
    /// Leaves the `Content-Type` header to the transport.
    #[must_use]
    pub const fn no_content_type() -> Self {
        Self {
            no_content_type: true,
            content_type: None,
        }
    }

    /// `Content-Type: application/json`.
    #[must_use]
    pub fn json() -> Self {
        Self {
            no_content_type: false,
            content_type: Some("application/json".to_string()),
        }
    }

    #[must_use]
    pub const fn is_no_content_type(&self) -> bool {
        self.no_content_type
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// A file picked in the browser's file input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadFile {
    /// File name as reported by the input
    pub name: String,
    /// MIME type as reported by the input
    pub mime_type: String,
    /// File content
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// Value of one multipart part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    File(UploadFile),
}

/// Ordered multipart form body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, PartValue)>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text part.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), PartValue::Text(value.into())));
        self
    }

    /// Appends a file part.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, file: UploadFile) -> Self {
        self.parts.push((name.into(), PartValue::File(file)));
        self
    }

    /// First part named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PartValue> {
        self.parts
            .iter()
            .find(|(part_name, _)| part_name == name)
            .map(|(_, value)| value)
    }

    /// First text part named `name`.
    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PartValue::Text(text) => Some(text),
            PartValue::File(_) => None,
        }
    }

    /// First file part named `name`.
    #[must_use]
    pub fn get_file(&self, name: &str) -> Option<&UploadFile> {
        match self.get(name)? {
            PartValue::File(file) => Some(file),
            PartValue::Text(_) => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
