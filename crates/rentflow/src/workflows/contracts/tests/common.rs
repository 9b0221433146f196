use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::workflows::contracts::domain::{
    Lease, LeaseId, LeaseStatus, PaymentMethod, Property, PropertyId, PropertyKind, Tenant,
    TenantId,
};
use crate::workflows::contracts::lifecycle::ContractStage;
use crate::workflows::contracts::repository::{
    ContractRecord, ContractSubmission, PropertyFile, RecordRepository, RepositoryError,
    TenantFileSet,
};
use crate::workflows::contracts::service::{ContractDeskService, DeskConfig};
use crate::workflows::contracts::signature::SignatureImage;
use crate::workflows::contracts::ContractId;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn tenant() -> Tenant {
    Tenant {
        id: TenantId("t-001".to_string()),
        full_name: "Jean Kouassi".to_string(),
        phone: "+225 07 01 02 03".to_string(),
        email: "jean.kouassi@example.ci".to_string(),
        id_number: "CI-1998-4471".to_string(),
        security_deposit: Some(1_000_000),
        payment_method: Some(PaymentMethod::MobileMoney),
        lease_start_date: Some(date(2025, 9, 1)),
        lease_end_date: Some(date(2026, 8, 31)),
    }
}

pub(super) fn tenant_without_lease() -> Tenant {
    Tenant {
        id: TenantId("t-002".to_string()),
        full_name: "Awa Traore".to_string(),
        phone: "+225 05 44 55 66".to_string(),
        email: "awa.traore@example.ci".to_string(),
        id_number: "CI-2001-0032".to_string(),
        security_deposit: None,
        payment_method: None,
        lease_start_date: None,
        lease_end_date: None,
    }
}

pub(super) fn property() -> Property {
    Property {
        id: PropertyId("p-001".to_string()),
        address: "Villa Cocody, Abidjan".to_string(),
        kind: PropertyKind::House,
        surface_m2: 240,
        rooms: 6,
    }
}

pub(super) fn second_property() -> Property {
    Property {
        id: PropertyId("p-002".to_string()),
        address: "Residence Plateau, Abidjan".to_string(),
        kind: PropertyKind::Apartment,
        surface_m2: 85,
        rooms: 3,
    }
}

pub(super) fn active_lease() -> Lease {
    Lease {
        id: LeaseId("l-001".to_string()),
        tenant: TenantId("t-001".to_string()),
        property: PropertyId("p-001".to_string()),
        status: LeaseStatus::Active,
        monthly_rent: 500_000,
        created_on: date(2025, 8, 15),
    }
}

pub(super) fn tenant_files() -> TenantFileSet {
    TenantFileSet {
        signed_lease_scan: Some("https://files.example.ci/t-001/lease.pdf".to_string()),
        identity_scan: Some("https://files.example.ci/t-001/cni.pdf".to_string()),
    }
}

pub(super) fn property_files() -> Vec<PropertyFile> {
    vec![
        PropertyFile {
            label: "Title deed".to_string(),
            url: "https://files.example.ci/p-001/deed.pdf".to_string(),
        },
        PropertyFile {
            label: "Floor plan".to_string(),
            url: "https://files.example.ci/p-001/plan.pdf".to_string(),
        },
    ]
}

pub(super) fn desk_config() -> DeskConfig {
    DeskConfig {
        signature_width: 120,
        signature_height: 48,
        max_upload_bytes: 64 * 1024,
    }
}

/// Record-store fixture. Failure switches let tests exercise the remote
/// error paths without a network.
#[derive(Default)]
pub(super) struct MemoryRepository {
    pub(super) tenants: Vec<Tenant>,
    pub(super) properties: Vec<Property>,
    pub(super) leases: Vec<Lease>,
    pub(super) tenant_files: HashMap<TenantId, TenantFileSet>,
    pub(super) property_files: HashMap<PropertyId, Vec<PropertyFile>>,
    contracts: Mutex<HashMap<ContractId, ContractRecord>>,
    sequence: AtomicU64,
    unavailable: AtomicBool,
    rejection: Mutex<BTreeMap<String, String>>,
    create_calls: AtomicU64,
    approve_calls: AtomicU64,
}

impl MemoryRepository {
    pub(super) fn seeded() -> Self {
        Self {
            tenants: vec![tenant(), tenant_without_lease()],
            properties: vec![property(), second_property()],
            leases: vec![active_lease()],
            tenant_files: HashMap::from([(TenantId("t-001".to_string()), tenant_files())]),
            property_files: HashMap::from([(PropertyId("p-001".to_string()), property_files())]),
            ..Self::default()
        }
    }

    pub(super) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(super) fn set_rejection(&self, field_errors: BTreeMap<String, String>) {
        *self.rejection.lock().expect("rejection mutex poisoned") = field_errors;
    }

    pub(super) fn create_calls(&self) -> u64 {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub(super) fn approve_calls(&self) -> u64 {
        self.approve_calls.load(Ordering::SeqCst)
    }

    pub(super) fn stored(&self, id: &ContractId) -> Option<ContractRecord> {
        self.contracts
            .lock()
            .expect("contracts mutex poisoned")
            .get(id)
            .cloned()
    }

    /// Simulates the out-of-scope tenant-side signing step.
    pub(super) fn record_tenant_signature(&self, id: &ContractId, signature: &str) {
        let mut guard = self.contracts.lock().expect("contracts mutex poisoned");
        if let Some(record) = guard.get_mut(id) {
            record.tenant_signature = Some(signature.to_string());
            record.stage = ContractStage::PendingOwnerApproval;
        }
    }

    fn guard_transport(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

impl RecordRepository for MemoryRepository {
    fn list_tenants(&self) -> Result<Vec<Tenant>, RepositoryError> {
        self.guard_transport()?;
        Ok(self.tenants.clone())
    }

    fn list_properties(&self) -> Result<Vec<Property>, RepositoryError> {
        self.guard_transport()?;
        Ok(self.properties.clone())
    }

    fn list_leases(&self) -> Result<Vec<Lease>, RepositoryError> {
        self.guard_transport()?;
        Ok(self.leases.clone())
    }

    fn tenant_documents(&self, tenant: &TenantId) -> Result<TenantFileSet, RepositoryError> {
        self.guard_transport()?;
        Ok(self.tenant_files.get(tenant).cloned().unwrap_or_default())
    }

    fn property_documents(
        &self,
        property: &PropertyId,
    ) -> Result<Vec<PropertyFile>, RepositoryError> {
        self.guard_transport()?;
        Ok(self.property_files.get(property).cloned().unwrap_or_default())
    }

    fn create_contract(
        &self,
        submission: ContractSubmission,
    ) -> Result<ContractRecord, RepositoryError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.guard_transport()?;

        let rejection = self.rejection.lock().expect("rejection mutex poisoned");
        if !rejection.is_empty() {
            return Err(RepositoryError::Rejected {
                field_errors: rejection.clone(),
            });
        }
        drop(rejection);

        let id = ContractId(format!(
            "c-{:04}",
            self.sequence.fetch_add(1, Ordering::SeqCst) + 1
        ));
        let tenant_name = self
            .tenants
            .iter()
            .find(|tenant| tenant.id == submission.tenant)
            .map(|tenant| tenant.full_name.clone())
            .unwrap_or_else(|| submission.tenant.0.clone());
        let property_address = self
            .properties
            .iter()
            .find(|property| property.id == submission.property)
            .map(|property| property.address.clone())
            .unwrap_or_else(|| submission.property.0.clone());

        let record = ContractRecord {
            id: id.clone(),
            stage: ContractStage::PendingTenantSignature,
            tenant: submission.tenant,
            tenant_name,
            property: submission.property,
            property_address,
            monthly_rent: submission.amount,
            contract_type: submission.contract_type,
            purpose: submission.purpose,
            start_date: submission.start_date,
            end_date: submission.end_date,
            security_deposit: submission.security_deposit,
            payment_method: submission.payment_method,
            payment_frequency: submission.payment_frequency,
            specific_rules: submission.specific_rules,
            insurance_text: submission.insurance_text,
            notes: submission.notes,
            tenant_signature: None,
            owner_signature: None,
        };

        self.contracts
            .lock()
            .expect("contracts mutex poisoned")
            .insert(id, record.clone());
        Ok(record)
    }

    fn fetch_contract(&self, id: &ContractId) -> Result<Option<ContractRecord>, RepositoryError> {
        self.guard_transport()?;
        Ok(self.stored(id))
    }

    fn approve_contract(
        &self,
        id: &ContractId,
        signature: SignatureImage,
    ) -> Result<ContractRecord, RepositoryError> {
        self.approve_calls.fetch_add(1, Ordering::SeqCst);
        self.guard_transport()?;

        let mut guard = self.contracts.lock().expect("contracts mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.owner_signature = Some(signature.to_base64());
        record.stage = ContractStage::Active;
        Ok(record.clone())
    }
}

pub(super) fn build_service() -> (
    ContractDeskService<MemoryRepository>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::seeded());
    let service = ContractDeskService::new(repository.clone(), desk_config());
    (service, repository)
}
