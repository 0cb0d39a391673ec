use std::collections::HashMap;

use axum::extract::Multipart;

use super::error::ApiError;

/// The uploaded `file` part of a multipart form.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// A multipart form with one optional file and plain text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            tracing::warn!(error = %e, "Malformed multipart body");
            ApiError::bad_request("Malformed upload").with_details(e.body_text())
        })? {
            let name = field.name().unwrap_or_default().to_string();

            // A `file` part without a filename is a plain text field, not an upload.
            if name == "file" && field.file_name().is_some() {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request("Malformed upload").with_details(e.body_text()))?;
                form.file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request("Malformed upload").with_details(e.body_text()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// The uploaded file, or `No file uploaded.` when absent or empty.
    pub fn require_file(&mut self) -> Result<UploadedFile, ApiError> {
        match self.file.take() {
            Some(file) if !file.bytes.is_empty() => Ok(file),
            _ => Err(ApiError::bad_request("No file uploaded.")),
        }
    }

    /// A text field, ignoring blank values.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}
