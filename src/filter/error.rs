use std::path::PathBuf;
use thiserror::Error;

use super::task_form::MAX_DOCUMENTS;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Only up to {max} PDF files allowed")]
    TooManyDocuments { max: usize },

    #[error("Not a PDF file: {0}")]
    NotPdf(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FormError {
    pub fn too_many_documents() -> Self {
        FormError::TooManyDocuments { max: MAX_DOCUMENTS }
    }
}
