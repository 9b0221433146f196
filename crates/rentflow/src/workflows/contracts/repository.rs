use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::documents::UploadedFile;
use super::domain::{
    ContractId, ContractType, Lease, LeaseId, PaymentFrequency, PaymentMethod, Property,
    PropertyId, Tenant, TenantId,
};
use super::lifecycle::ContractStage;
use super::signature::SignatureImage;

/// Known per-tenant document fields held by the record store. Empty
/// fields mean the document was never filed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantFileSet {
    pub signed_lease_scan: Option<String>,
    pub identity_scan: Option<String>,
}

/// One attachment of a property's document list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFile {
    pub label: String,
    pub url: String,
}

/// Fully-specified creation payload, bundled fire-once with its file
/// attachments. Built from a draft that already passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractSubmission {
    pub tenant: TenantId,
    pub property: PropertyId,
    pub lease: Option<LeaseId>,
    pub contract_type: ContractType,
    pub purpose: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub amount: u32,
    pub security_deposit: Option<u32>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_frequency: Option<PaymentFrequency>,
    pub specific_rules: Option<String>,
    pub insurance_text: Option<String>,
    pub notes: Option<String>,
    pub contract_files: Vec<UploadedFile>,
    pub identity_file: Option<UploadedFile>,
}

/// Persisted contract as the record store reports it back. The engine
/// treats it as opaque beyond the fields the approval screen renders;
/// signatures are base64 PNG strings carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRecord {
    pub id: ContractId,
    pub stage: ContractStage,
    pub tenant: TenantId,
    pub tenant_name: String,
    pub property: PropertyId,
    pub property_address: String,
    pub monthly_rent: u32,
    pub contract_type: ContractType,
    pub purpose: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub security_deposit: Option<u32>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_frequency: Option<PaymentFrequency>,
    pub specific_rules: Option<String>,
    pub insurance_text: Option<String>,
    pub notes: Option<String>,
    pub tenant_signature: Option<String>,
    pub owner_signature: Option<String>,
}

impl ContractRecord {
    pub fn status_view(&self) -> ContractStatusView {
        ContractStatusView {
            contract_id: self.id.clone(),
            stage: self.stage.label(),
            tenant_name: self.tenant_name.clone(),
            property_address: self.property_address.clone(),
            monthly_rent: self.monthly_rent,
        }
    }
}

/// Sanitized representation of a contract's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ContractStatusView {
    pub contract_id: ContractId,
    pub stage: &'static str,
    pub tenant_name: String,
    pub property_address: String,
    pub monthly_rent: u32,
}

/// Record-store abstraction so the contract engine can be exercised in
/// isolation. All calls are plain request/response; nothing is retried
/// silently on failure.
pub trait RecordRepository: Send + Sync {
    fn list_tenants(&self) -> Result<Vec<Tenant>, RepositoryError>;
    fn list_properties(&self) -> Result<Vec<Property>, RepositoryError>;
    fn list_leases(&self) -> Result<Vec<Lease>, RepositoryError>;
    fn tenant_documents(&self, tenant: &TenantId) -> Result<TenantFileSet, RepositoryError>;
    fn property_documents(&self, property: &PropertyId)
        -> Result<Vec<PropertyFile>, RepositoryError>;
    fn create_contract(
        &self,
        submission: ContractSubmission,
    ) -> Result<ContractRecord, RepositoryError>;
    fn fetch_contract(&self, id: &ContractId) -> Result<Option<ContractRecord>, RepositoryError>;
    fn approve_contract(
        &self,
        id: &ContractId,
        signature: SignatureImage,
    ) -> Result<ContractRecord, RepositoryError>;
}

/// Error enumeration for record-store failures. `Rejected` carries the
/// field-level payload of a refused submission; `Unavailable` is the
/// transport failure the user should retry rather than correct.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("submission rejected by the record store")]
    Rejected {
        field_errors: BTreeMap<String, String>,
    },
    #[error("record store unreachable: {0}")]
    Unavailable(String),
}
