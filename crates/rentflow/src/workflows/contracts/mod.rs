//! Contract lifecycle engine: draft assembly with cascading auto-fill,
//! supporting-document aggregation, draft validation, freehand signature
//! capture, and the staged progression from draft to active contract.
//!
//! The record store (tenants, properties, leases, persisted contracts) is
//! an external collaborator reached through the [`RecordRepository`]
//! boundary so the whole engine can be exercised against in-memory
//! fixtures.

pub mod cascade;
pub mod documents;
pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;
pub mod signature;
pub mod validation;

#[cfg(test)]
mod tests;

pub use cascade::{resolve_property_selection, resolve_tenant_selection, Directory};
pub use documents::{DocumentBinder, DocumentOrigin, DocumentRef, UploadError, UploadedFile};
pub use domain::{
    ContractDraft, ContractId, ContractType, FormStep, Lease, LeaseId, LeaseStatus,
    PaymentFrequency, PaymentMethod, Property, PropertyId, PropertyKind, Tenant, TenantId,
};
pub use lifecycle::{advance, ContractStage, StageError};
pub use repository::{
    ContractRecord, ContractStatusView, ContractSubmission, PropertyFile, RecordRepository,
    RepositoryError, TenantFileSet,
};
pub use router::contract_router;
pub use service::{
    ApprovalView, CascadeTicket, ContractDeskService, ContractWorkflowError, DeskConfig,
    DraftSession, Selection,
};
pub use signature::{Point, SignatureError, SignatureImage, SignaturePad};
pub use validation::{validate, DraftField};
