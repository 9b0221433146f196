use super::domain::{
    ContractDraft, Lease, LeaseStatus, Property, PropertyId, Tenant, TenantId,
};

/// The already-fetched entity collections a cascade derives from. The
/// resolver never talks to the record store itself; the caller hands it
/// whatever snapshot the screen currently holds.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub tenants: Vec<Tenant>,
    pub properties: Vec<Property>,
    pub leases: Vec<Lease>,
}

impl Directory {
    pub fn tenant(&self, id: &TenantId) -> Option<&Tenant> {
        self.tenants.iter().find(|tenant| &tenant.id == id)
    }

    pub fn property(&self, id: &PropertyId) -> Option<&Property> {
        self.properties.iter().find(|property| &property.id == id)
    }

    /// The tenant's active lease. When the store violates its own
    /// at-most-one-active invariant, the latest `created_on` wins, ties
    /// broken by the highest lease id, so the pick never depends on
    /// collection order.
    pub fn active_lease_for(&self, tenant: &TenantId) -> Option<&Lease> {
        self.leases
            .iter()
            .filter(|lease| &lease.tenant == tenant && lease.status == LeaseStatus::Active)
            .max_by(|a, b| {
                a.created_on
                    .cmp(&b.created_on)
                    .then_with(|| a.id.cmp(&b.id))
            })
    }
}

/// Derives the draft fields that follow from picking a tenant.
///
/// On a hit the lease fixes property, lease reference and amount, and the
/// tenant record contributes dates, deposit and payment method. An
/// unknown tenant or a tenant without an active lease clears the derived
/// fields instead of leaving them stale; neither case is an error.
pub fn resolve_tenant_selection(
    directory: &Directory,
    tenant_id: &TenantId,
    draft: &ContractDraft,
) -> ContractDraft {
    let mut next = draft.clone();

    let Some(tenant) = directory.tenant(tenant_id) else {
        next.tenant = None;
        next.clear_lease_derivation();
        return next;
    };

    next.tenant = Some(tenant.id.clone());

    let Some(lease) = directory.active_lease_for(tenant_id) else {
        next.clear_lease_derivation();
        return next;
    };

    next.property = Some(lease.property.clone());
    next.lease = Some(lease.id.clone());
    next.amount = Some(lease.monthly_rent);
    next.start_date = tenant.lease_start_date;
    next.end_date = tenant.lease_end_date;
    next.security_deposit = tenant.security_deposit;
    next.payment_method = tenant.payment_method;

    // Keep the descriptors aligned with the lease-fixed property so the
    // review step never shows the previous selection's address.
    match directory.property(&lease.property) {
        Some(property) => fill_property_descriptors(&mut next, property),
        None => next.clear_property_descriptors(),
    }

    next
}

/// Derives the descriptive draft fields that follow from picking a
/// property directly. Unknown identifiers clear the descriptors.
pub fn resolve_property_selection(
    directory: &Directory,
    property_id: &PropertyId,
    draft: &ContractDraft,
) -> ContractDraft {
    let mut next = draft.clone();

    let Some(property) = directory.property(property_id) else {
        next.property = None;
        next.clear_property_descriptors();
        return next;
    };

    next.property = Some(property.id.clone());
    fill_property_descriptors(&mut next, property);
    next
}

fn fill_property_descriptors(draft: &mut ContractDraft, property: &Property) {
    draft.property_address = Some(property.address.clone());
    draft.property_kind = Some(property.kind);
    draft.property_surface_m2 = Some(property.surface_m2);
    draft.property_rooms = Some(property.rooms);
}
