use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::ContractDraft;

/// Draft fields the validator can attach a message to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftField {
    Tenant,
    Property,
    ContractType,
    StartDate,
    EndDate,
    Amount,
}

impl DraftField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tenant => "Tenant",
            Self::Property => "Property",
            Self::ContractType => "Contract type",
            Self::StartDate => "Start date",
            Self::EndDate => "End date",
            Self::Amount => "Amount",
        }
    }
}

/// Gatekeeper run synchronously on every submit attempt. An empty map
/// means the draft is submittable. The function is a pure projection of
/// the draft, so re-running it on the same input yields the same map and
/// fixing one field removes exactly that field's entry.
pub fn validate(draft: &ContractDraft) -> BTreeMap<DraftField, String> {
    let mut errors = BTreeMap::new();

    if draft.tenant.is_none() {
        errors.insert(DraftField::Tenant, "select a tenant".to_string());
    }
    if draft.property.is_none() {
        errors.insert(DraftField::Property, "select a property".to_string());
    }
    if draft.contract_type.is_none() {
        errors.insert(DraftField::ContractType, "choose a contract type".to_string());
    }
    if draft.start_date.is_none() {
        errors.insert(DraftField::StartDate, "set a start date".to_string());
    }

    match draft.amount {
        None => {
            errors.insert(DraftField::Amount, "enter the rent amount".to_string());
        }
        Some(0) => {
            errors.insert(
                DraftField::Amount,
                "rent amount must be greater than zero".to_string(),
            );
        }
        Some(_) => {}
    }

    if let (Some(start), Some(end)) = (draft.start_date, draft.end_date) {
        if end <= start {
            errors.insert(
                DraftField::EndDate,
                "end date must come after the start date".to_string(),
            );
        }
    }

    errors
}
