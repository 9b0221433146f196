use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Identifier wrapper for tenants as issued by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(pub String);

/// Identifier wrapper for properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

/// Identifier wrapper for leases ("locations" in the agency's vocabulary).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LeaseId(pub String);

/// Identifier wrapper for persisted contracts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractId(pub String);

/// Tenant record as listed by the record store. Owned by the property
/// owner and edited elsewhere; the contract engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub id_number: String,
    pub security_deposit: Option<u32>,
    pub payment_method: Option<PaymentMethod>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
}

/// Property record, read-only to the contract engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub address: String,
    pub kind: PropertyKind,
    pub surface_m2: u32,
    pub rooms: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    House,
    Apartment,
    Studio,
    Commercial,
}

impl PropertyKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::House => "House",
            Self::Apartment => "Apartment",
            Self::Studio => "Studio",
            Self::Commercial => "Commercial",
        }
    }
}

/// Binding record connecting one tenant to one property with a monthly
/// rent and an activity status. The record store is responsible for the
/// at-most-one-active-lease-per-tenant invariant; the cascade resolver
/// applies a deterministic tie-break when the data violates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lease {
    pub id: LeaseId,
    pub tenant: TenantId,
    pub property: PropertyId,
    pub status: LeaseStatus,
    pub monthly_rent: u32,
    pub created_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Active,
    Ended,
    Other,
}

impl LeaseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Ended => "Ended",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Residential,
    Furnished,
    Commercial,
    Professional,
}

impl ContractType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Residential => "Residential",
            Self::Furnished => "Furnished",
            Self::Commercial => "Commercial",
            Self::Professional => "Professional",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    MobileMoney,
    Cheque,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::BankTransfer => "Bank transfer",
            Self::MobileMoney => "Mobile money",
            Self::Cheque => "Cheque",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    Biannual,
    Annual,
}

impl PaymentFrequency {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Monthly => "Monthly",
            Self::Quarterly => "Quarterly",
            Self::Biannual => "Every six months",
            Self::Annual => "Annual",
        }
    }
}

/// Mutable work-in-progress contract, held only in the draft session
/// until submitted. Every field is optional; the validator decides what
/// a submittable draft looks like.
///
/// The `property_*` descriptors are derived by the property cascade and
/// are cleared together with the property reference so they can never go
/// stale against a newer selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractDraft {
    pub tenant: Option<TenantId>,
    pub property: Option<PropertyId>,
    pub lease: Option<LeaseId>,
    pub contract_type: Option<ContractType>,
    pub purpose: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub amount: Option<u32>,
    pub security_deposit: Option<u32>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_frequency: Option<PaymentFrequency>,
    pub specific_rules: Option<String>,
    pub insurance_text: Option<String>,
    pub notes: Option<String>,
    pub property_address: Option<String>,
    pub property_kind: Option<PropertyKind>,
    pub property_surface_m2: Option<u32>,
    pub property_rooms: Option<u8>,
}

impl ContractDraft {
    /// Drops the lease-derived fields after a cascade miss so a previous
    /// selection cannot leak into the submission.
    pub(crate) fn clear_lease_derivation(&mut self) {
        self.property = None;
        self.lease = None;
        self.amount = None;
        self.clear_property_descriptors();
    }

    pub(crate) fn clear_property_descriptors(&mut self) {
        self.property_address = None;
        self.property_kind = None;
        self.property_surface_m2 = None;
        self.property_rooms = None;
    }
}

/// Steps of the creation screen. A closed union with an explicit
/// transition table keeps unknown step tags unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    Parties,
    Terms,
    Documents,
    Review,
}

impl FormStep {
    pub const fn ordered() -> [Self; 4] {
        [Self::Parties, Self::Terms, Self::Documents, Self::Review]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Parties => "Tenant & Property",
            Self::Terms => "Contract Terms",
            Self::Documents => "Supporting Documents",
            Self::Review => "Review & Submit",
        }
    }

    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Parties => Some(Self::Terms),
            Self::Terms => Some(Self::Documents),
            Self::Documents => Some(Self::Review),
            Self::Review => None,
        }
    }

    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Parties => None,
            Self::Terms => Some(Self::Parties),
            Self::Documents => Some(Self::Terms),
            Self::Review => Some(Self::Documents),
        }
    }
}

impl Default for FormStep {
    fn default() -> Self {
        Self::Parties
    }
}
