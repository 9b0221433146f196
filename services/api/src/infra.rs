use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use rentflow::config::DeskSettings;
use rentflow::workflows::contracts::{
    ContractId, ContractRecord, ContractStage, ContractSubmission, DeskConfig, Lease, LeaseId,
    LeaseStatus, PaymentMethod, Property, PropertyFile, PropertyId, PropertyKind,
    RecordRepository, RepositoryError, SignatureImage, Tenant, TenantFileSet, TenantId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn desk_config(settings: &DeskSettings) -> DeskConfig {
    DeskConfig {
        signature_width: settings.signature_width,
        signature_height: settings.signature_height,
        max_upload_bytes: settings.max_upload_bytes,
    }
}

#[derive(Default)]
struct StoreState {
    tenants: Vec<Tenant>,
    properties: Vec<Property>,
    leases: Vec<Lease>,
    tenant_files: HashMap<TenantId, TenantFileSet>,
    property_files: HashMap<PropertyId, Vec<PropertyFile>>,
    contracts: HashMap<ContractId, ContractRecord>,
    sequence: u64,
}

/// Stand-in record store holding everything behind one mutex. The real
/// deployment talks to the management backend; this keeps the service
/// self-contained for demos and tests.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordRepository {
    inner: Arc<Mutex<StoreState>>,
}

impl InMemoryRecordRepository {
    pub(crate) fn with_sample_records() -> Self {
        let repository = Self::default();
        {
            let mut state = repository.inner.lock().expect("record store mutex poisoned");
            state.tenants = sample_tenants();
            state.properties = sample_properties();
            state.leases = sample_leases();
            state.tenant_files = sample_tenant_files();
            state.property_files = sample_property_files();
        }
        repository
    }

    /// Simulates the tenant-side signing step that happens outside this
    /// service.
    pub(crate) fn record_tenant_signature(&self, id: &ContractId, signature: &str) {
        let mut state = self.inner.lock().expect("record store mutex poisoned");
        if let Some(record) = state.contracts.get_mut(id) {
            record.tenant_signature = Some(signature.to_string());
            record.stage = ContractStage::PendingOwnerApproval;
        }
    }
}

impl RecordRepository for InMemoryRecordRepository {
    fn list_tenants(&self) -> Result<Vec<Tenant>, RepositoryError> {
        let state = self.inner.lock().expect("record store mutex poisoned");
        Ok(state.tenants.clone())
    }

    fn list_properties(&self) -> Result<Vec<Property>, RepositoryError> {
        let state = self.inner.lock().expect("record store mutex poisoned");
        Ok(state.properties.clone())
    }

    fn list_leases(&self) -> Result<Vec<Lease>, RepositoryError> {
        let state = self.inner.lock().expect("record store mutex poisoned");
        Ok(state.leases.clone())
    }

    fn tenant_documents(&self, tenant: &TenantId) -> Result<TenantFileSet, RepositoryError> {
        let state = self.inner.lock().expect("record store mutex poisoned");
        Ok(state.tenant_files.get(tenant).cloned().unwrap_or_default())
    }

    fn property_documents(
        &self,
        property: &PropertyId,
    ) -> Result<Vec<PropertyFile>, RepositoryError> {
        let state = self.inner.lock().expect("record store mutex poisoned");
        Ok(state
            .property_files
            .get(property)
            .cloned()
            .unwrap_or_default())
    }

    fn create_contract(
        &self,
        submission: ContractSubmission,
    ) -> Result<ContractRecord, RepositoryError> {
        let mut state = self.inner.lock().expect("record store mutex poisoned");

        state.sequence += 1;
        let id = ContractId(format!("c-{:04}", state.sequence));
        let tenant_name = state
            .tenants
            .iter()
            .find(|tenant| tenant.id == submission.tenant)
            .map(|tenant| tenant.full_name.clone())
            .unwrap_or_else(|| submission.tenant.0.clone());
        let property_address = state
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

        state.contracts.insert(id, record.clone());
        Ok(record)
    }

    fn fetch_contract(&self, id: &ContractId) -> Result<Option<ContractRecord>, RepositoryError> {
        let state = self.inner.lock().expect("record store mutex poisoned");
        Ok(state.contracts.get(id).cloned())
    }

    fn approve_contract(
        &self,
        id: &ContractId,
        signature: SignatureImage,
    ) -> Result<ContractRecord, RepositoryError> {
        let mut state = self.inner.lock().expect("record store mutex poisoned");
        let record = state.contracts.get_mut(id).ok_or(RepositoryError::NotFound)?;
        record.owner_signature = Some(signature.to_base64());
        record.stage = ContractStage::Active;
        Ok(record.clone())
    }
}

fn sample_tenants() -> Vec<Tenant> {
    vec![
        Tenant {
            id: TenantId("t-001".to_string()),
            full_name: "Jean Kouassi".to_string(),
            phone: "+225 07 01 02 03".to_string(),
            email: "jean.kouassi@example.ci".to_string(),
            id_number: "CI-1998-4471".to_string(),
            security_deposit: Some(1_000_000),
            payment_method: Some(PaymentMethod::MobileMoney),
            lease_start_date: parse_date("2025-09-01").ok(),
            lease_end_date: parse_date("2026-08-31").ok(),
        },
        Tenant {
            id: TenantId("t-002".to_string()),
            full_name: "Awa Traore".to_string(),
            phone: "+225 05 44 55 66".to_string(),
            email: "awa.traore@example.ci".to_string(),
            id_number: "CI-2001-0032".to_string(),
            security_deposit: None,
            payment_method: Some(PaymentMethod::BankTransfer),
            lease_start_date: None,
            lease_end_date: None,
        },
    ]
}

fn sample_properties() -> Vec<Property> {
    vec![
        Property {
            id: PropertyId("p-001".to_string()),
            address: "Villa Cocody, Abidjan".to_string(),
            kind: PropertyKind::House,
            surface_m2: 240,
            rooms: 6,
        },
        Property {
            id: PropertyId("p-002".to_string()),
            address: "Residence Plateau, Abidjan".to_string(),
            kind: PropertyKind::Apartment,
            surface_m2: 85,
            rooms: 3,
        },
    ]
}

fn sample_leases() -> Vec<Lease> {
    vec![Lease {
        id: LeaseId("l-001".to_string()),
        tenant: TenantId("t-001".to_string()),
        property: PropertyId("p-001".to_string()),
        status: LeaseStatus::Active,
        monthly_rent: 500_000,
        created_on: parse_date("2025-08-15").unwrap_or_default(),
    }]
}

fn sample_tenant_files() -> HashMap<TenantId, TenantFileSet> {
    HashMap::from([(
        TenantId("t-001".to_string()),
        TenantFileSet {
            signed_lease_scan: Some("https://files.example.ci/t-001/lease.pdf".to_string()),
            identity_scan: Some("https://files.example.ci/t-001/cni.pdf".to_string()),
        },
    )])
}

fn sample_property_files() -> HashMap<PropertyId, Vec<PropertyFile>> {
    HashMap::from([(
        PropertyId("p-001".to_string()),
        vec![
            PropertyFile {
                label: "Title deed".to_string(),
                url: "https://files.example.ci/p-001/deed.pdf".to_string(),
            },
            PropertyFile {
                label: "Floor plan".to_string(),
                url: "https://files.example.ci/p-001/plan.pdf".to_string(),
            },
        ],
    )])
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
