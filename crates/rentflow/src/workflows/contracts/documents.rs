use serde::{Deserialize, Serialize};

use super::repository::{PropertyFile, TenantFileSet};

/// Where a document reference originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentOrigin {
    Tenant,
    Property,
    UserUpload,
}

impl DocumentOrigin {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tenant => "Tenant",
            Self::Property => "Property",
            Self::UserUpload => "User upload",
        }
    }
}

/// Display-ready projection of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub name: String,
    pub url: String,
    pub origin: DocumentOrigin,
}

/// A file the user attached in the browser session. Validated on entry so
/// the submission step never carries an unreadable payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadError> {
        let file_name = file_name.into();
        let content_type = content_type.into();

        if bytes.is_empty() {
            return Err(UploadError::EmptyFile { file_name });
        }
        if content_type.parse::<mime::Mime>().is_err() {
            return Err(UploadError::UnreadableContentType {
                file_name,
                content_type,
            });
        }

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Errors raised while accepting a user-supplied file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("uploaded file '{file_name}' is empty")]
    EmptyFile { file_name: String },
    #[error("uploaded file '{file_name}' has unreadable content type '{content_type}'")]
    UnreadableContentType {
        file_name: String,
        content_type: String,
    },
    #[error("uploaded file '{file_name}' exceeds the {limit} byte limit")]
    TooLarge { file_name: String, limit: usize },
}

/// Aggregated supporting documents for the draft under assembly.
///
/// The two labeled groups are always vectors, possibly empty, so
/// rendering never has to branch on the container itself. The identity
/// slot holds at most one file; the contract-scan list is the
/// unrestricted one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentBinder {
    pub tenant_docs: Vec<DocumentRef>,
    pub property_docs: Vec<DocumentRef>,
    pub identity_upload: Option<UploadedFile>,
    pub contract_files: Vec<UploadedFile>,
}

impl DocumentBinder {
    /// Replaces the tenant group with the non-empty document fields of
    /// the record store's answer for the resolved tenant.
    pub fn set_tenant_documents(&mut self, files: &TenantFileSet) {
        self.tenant_docs = project_tenant_files(files);
    }

    pub fn clear_tenant_documents(&mut self) {
        self.tenant_docs.clear();
    }

    /// Replaces the property group with the resolved property's attached
    /// document list.
    pub fn set_property_documents(&mut self, files: &[PropertyFile]) {
        self.property_docs = files
            .iter()
            .map(|file| DocumentRef {
                name: file.label.clone(),
                url: file.url.clone(),
                origin: DocumentOrigin::Property,
            })
            .collect();
    }

    pub fn clear_property_documents(&mut self) {
        self.property_docs.clear();
    }

    /// Single-slot assignment: a new identity document replaces whatever
    /// was there before.
    pub fn attach_identity(&mut self, file: UploadedFile) {
        self.identity_upload = Some(file);
    }

    pub fn clear_identity(&mut self) {
        self.identity_upload = None;
    }

    pub fn attach_contract_file(&mut self, file: UploadedFile) {
        self.contract_files.push(file);
    }

    pub fn clear_contract_files(&mut self) {
        self.contract_files.clear();
    }
}

fn project_tenant_files(files: &TenantFileSet) -> Vec<DocumentRef> {
    let mut docs = Vec::new();

    if let Some(url) = non_empty(files.signed_lease_scan.as_deref()) {
        docs.push(DocumentRef {
            name: "Signed lease".to_string(),
            url,
            origin: DocumentOrigin::Tenant,
        });
    }
    if let Some(url) = non_empty(files.identity_scan.as_deref()) {
        docs.push(DocumentRef {
            name: "Identity document".to_string(),
            url,
            origin: DocumentOrigin::Tenant,
        });
    }

    docs
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}
