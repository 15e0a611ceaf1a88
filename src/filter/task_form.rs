use chrono::NaiveDate;
use std::path::Path;

use super::error::FormError;
use crate::api::FormPart;
use crate::types::{Priority, TaskStatus};

/// Attachment cap enforced before `POST /tasks`
pub const MAX_DOCUMENTS: usize = 3;

const PDF_MAGIC: &[u8] = b"%PDF";

/// A PDF picked for upload
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Document {
    /// Accepts files with a `.pdf` extension or a PDF header
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, FormError> {
        let file_name = file_name.into();
        let has_pdf_extension = Path::new(&file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

        if !has_pdf_extension && !bytes.starts_with(PDF_MAGIC) {
            return Err(FormError::NotPdf(file_name));
        }
        Ok(Self { file_name, bytes })
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, FormError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| FormError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        Self::new(file_name, bytes)
    }
}

/// Fields of the create-task form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<String>,
    documents: Vec<Document>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            due_date: Some(due_date),
            ..Self::default()
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn add_document(&mut self, document: Document) -> Result<(), FormError> {
        if self.documents.len() >= MAX_DOCUMENTS {
            return Err(FormError::too_many_documents());
        }
        self.documents.push(document);
        Ok(())
    }

    pub fn remove_document(&mut self, index: usize) -> Option<Document> {
        (index < self.documents.len()).then(|| self.documents.remove(index))
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingField("title"));
        }
        if self.due_date.is_none() {
            return Err(FormError::MissingField("dueDate"));
        }
        if self.documents.len() > MAX_DOCUMENTS {
            return Err(FormError::too_many_documents());
        }
        Ok(())
    }

    /// Multipart body: the text fields, then one `documents` part per file
    pub fn into_parts(self) -> Result<Vec<FormPart>, FormError> {
        self.validate()?;

        let due = self.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        let mut parts = vec![
            FormPart::text("title", self.title),
            FormPart::text("description", self.description),
            FormPart::text("status", self.status.as_str()),
            FormPart::text("priority", self.priority.as_str()),
            FormPart::text("dueDate", due),
            FormPart::text("assignedTo", self.assigned_to.unwrap_or_default()),
        ];

        parts.extend(self.documents.into_iter().map(|doc| FormPart::File {
            name: "documents".to_string(),
            file_name: doc.file_name,
            mime: "application/pdf".to_string(),
            bytes: doc.bytes,
        }));
        Ok(parts)
    }
}
