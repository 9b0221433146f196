use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::cascade::{self, Directory};
use super::documents::{DocumentBinder, UploadError, UploadedFile};
use super::domain::{ContractDraft, ContractId, FormStep, PropertyId, TenantId};
use super::lifecycle::{self, ContractStage, StageError};
use super::repository::{
    ContractRecord, ContractSubmission, PropertyFile, RecordRepository, RepositoryError,
    TenantFileSet,
};
use super::signature::{SignatureError, SignaturePad};
use super::validation::{self, DraftField};

/// Tunables for one contract desk: the signature surface handed to the
/// approval screen and the per-file upload cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeskConfig {
    pub signature_width: u32,
    pub signature_height: u32,
    pub max_upload_bytes: usize,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            signature_width: 480,
            signature_height: 160,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Identity of one user selection, used to key cascade and document
/// responses to the selection that asked for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Tenant(TenantId),
    Property(PropertyId),
}

/// Handle for one cascade round. Responses carrying a ticket older than
/// the session's latest generation are discarded, which gives
/// last-write-wins by selection identity rather than by response arrival
/// order.
#[derive(Debug, Clone)]
pub struct CascadeTicket {
    generation: u64,
    selection: Selection,
}

impl CascadeTicket {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}

/// The strongly-typed replacement for a free-form form-state bag: one
/// draft, its document binder, the current step, field errors from the
/// last submit attempt, and the bookkeeping that keeps rapid selections
/// and duplicate submissions deterministic.
#[derive(Debug, Default)]
pub struct DraftSession {
    draft: ContractDraft,
    binder: DocumentBinder,
    errors: BTreeMap<DraftField, String>,
    step: FormStep,
    generation: u64,
    submission_in_flight: bool,
}

impl DraftSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &ContractDraft {
        &self.draft
    }

    pub fn binder(&self) -> &DocumentBinder {
        &self.binder
    }

    pub fn errors(&self) -> &BTreeMap<DraftField, String> {
        &self.errors
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    /// Applies a scalar edit to the draft in place.
    pub fn edit(&mut self, apply: impl FnOnce(&mut ContractDraft)) {
        apply(&mut self.draft);
    }

    pub fn next_step(&mut self) -> Option<FormStep> {
        self.step.next().map(|step| {
            self.step = step;
            step
        })
    }

    pub fn previous_step(&mut self) -> Option<FormStep> {
        self.step.previous().map(|step| {
            self.step = step;
            step
        })
    }

    pub fn goto_step(&mut self, step: FormStep) {
        self.step = step;
    }

    /// Starts a new cascade round; every earlier ticket becomes stale.
    pub fn begin_selection(&mut self, selection: Selection) -> CascadeTicket {
        self.generation += 1;
        CascadeTicket {
            generation: self.generation,
            selection,
        }
    }

    pub fn is_current(&self, ticket: &CascadeTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Installs a resolved draft unless a newer selection superseded the
    /// ticket. Returns whether the result was applied.
    pub fn apply_cascade(&mut self, ticket: &CascadeTicket, resolved: ContractDraft) -> bool {
        if !self.is_current(ticket) {
            debug!(generation = ticket.generation, "discarding stale cascade result");
            return false;
        }
        self.draft = resolved;
        true
    }

    /// Installs the tenant document group. Discarded when the ticket is
    /// stale or when the response is for a tenant the draft no longer
    /// resolves to.
    pub fn apply_tenant_documents(
        &mut self,
        ticket: &CascadeTicket,
        tenant: &TenantId,
        files: &TenantFileSet,
    ) -> bool {
        if !self.is_current(ticket) || self.draft.tenant.as_ref() != Some(tenant) {
            debug!(tenant = %tenant.0, "discarding stale tenant document response");
            return false;
        }
        self.binder.set_tenant_documents(files);
        true
    }

    pub fn apply_property_documents(
        &mut self,
        ticket: &CascadeTicket,
        property: &PropertyId,
        files: &[PropertyFile],
    ) -> bool {
        if !self.is_current(ticket) || self.draft.property.as_ref() != Some(property) {
            debug!(property = %property.0, "discarding stale property document response");
            return false;
        }
        self.binder.set_property_documents(files);
        true
    }

    pub fn binder_mut(&mut self) -> &mut DocumentBinder {
        &mut self.binder
    }

    pub(crate) fn set_errors(&mut self, errors: BTreeMap<DraftField, String>) {
        self.errors = errors;
    }

    pub(crate) fn begin_submission(&mut self) -> Result<(), ContractWorkflowError> {
        if self.submission_in_flight {
            return Err(ContractWorkflowError::SubmissionInFlight);
        }
        self.submission_in_flight = true;
        Ok(())
    }

    pub(crate) fn finish_submission(&mut self) {
        self.submission_in_flight = false;
    }

    /// Destroys the draft, as happens on submit success or an explicit
    /// cancel. The generation counter keeps counting so a straggling
    /// response from the old draft can never land in the new one.
    pub fn reset(&mut self) {
        self.draft = ContractDraft::default();
        self.binder = DocumentBinder::default();
        self.errors.clear();
        self.step = FormStep::default();
        self.submission_in_flight = false;
        self.generation += 1;
    }
}

/// Orchestrates the contract lifecycle against the record store: entity
/// directory, selection cascades, document aggregation, draft submission
/// and owner approval.
pub struct ContractDeskService<R> {
    repository: Arc<R>,
    config: DeskConfig,
}

impl<R> ContractDeskService<R>
where
    R: RecordRepository + 'static,
{
    pub fn new(repository: Arc<R>, config: DeskConfig) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> DeskConfig {
        self.config
    }

    /// A fresh pad sized to the configured signature surface.
    pub fn blank_pad(&self) -> Result<SignaturePad, ContractWorkflowError> {
        SignaturePad::new(self.config.signature_width, self.config.signature_height)
            .map_err(ContractWorkflowError::from)
    }

    /// Fetches the entity collections the creation screen derives from.
    pub fn directory(&self) -> Result<Directory, ContractWorkflowError> {
        Ok(Directory {
            tenants: self.repository.list_tenants()?,
            properties: self.repository.list_properties()?,
            leases: self.repository.list_leases()?,
        })
    }

    /// Runs the tenant cascade and refreshes both document groups for the
    /// newly resolved tenant and property.
    pub fn select_tenant(
        &self,
        session: &mut DraftSession,
        directory: &Directory,
        tenant: &TenantId,
    ) -> Result<(), ContractWorkflowError> {
        let ticket = session.begin_selection(Selection::Tenant(tenant.clone()));
        let resolved = cascade::resolve_tenant_selection(directory, tenant, session.draft());
        session.apply_cascade(&ticket, resolved);
        self.refresh_documents(session, &ticket)
    }

    /// Runs the direct property cascade. A property fixed by the tenant's
    /// active lease takes precedence, so the direct selection is skipped
    /// while a lease reference is present.
    pub fn select_property(
        &self,
        session: &mut DraftSession,
        directory: &Directory,
        property: &PropertyId,
    ) -> Result<(), ContractWorkflowError> {
        if session.draft().lease.is_some() {
            debug!(property = %property.0, "property already fixed by an active lease");
            return Ok(());
        }

        let ticket = session.begin_selection(Selection::Property(property.clone()));
        let resolved = cascade::resolve_property_selection(directory, property, session.draft());
        session.apply_cascade(&ticket, resolved);
        self.refresh_documents(session, &ticket)
    }

    fn refresh_documents(
        &self,
        session: &mut DraftSession,
        ticket: &CascadeTicket,
    ) -> Result<(), ContractWorkflowError> {
        match session.draft().tenant.clone() {
            Some(tenant) => {
                let files = self.repository.tenant_documents(&tenant)?;
                session.apply_tenant_documents(ticket, &tenant, &files);
            }
            None => session.binder_mut().clear_tenant_documents(),
        }

        match session.draft().property.clone() {
            Some(property) => {
                let files = self.repository.property_documents(&property)?;
                session.apply_property_documents(ticket, &property, &files);
            }
            None => session.binder_mut().clear_property_documents(),
        }

        Ok(())
    }

    /// Accepts an identity-document upload into the single slot.
    pub fn attach_identity(
        &self,
        session: &mut DraftSession,
        file: UploadedFile,
    ) -> Result<(), ContractWorkflowError> {
        self.check_size(&file)?;
        session.binder_mut().attach_identity(file);
        Ok(())
    }

    /// Adds a contract scan to the unrestricted attachment list.
    pub fn attach_contract_file(
        &self,
        session: &mut DraftSession,
        file: UploadedFile,
    ) -> Result<(), ContractWorkflowError> {
        self.check_size(&file)?;
        session.binder_mut().attach_contract_file(file);
        Ok(())
    }

    fn check_size(&self, file: &UploadedFile) -> Result<(), ContractWorkflowError> {
        if file.size() > self.config.max_upload_bytes {
            return Err(ContractWorkflowError::Upload(UploadError::TooLarge {
                file_name: file.file_name.clone(),
                limit: self.config.max_upload_bytes,
            }));
        }
        Ok(())
    }

    /// Validates and submits the draft. On success the record store owns
    /// the contract and the session is reset; on any failure the draft is
    /// preserved so the user can retry without re-entering data.
    pub fn submit(
        &self,
        session: &mut DraftSession,
    ) -> Result<ContractRecord, ContractWorkflowError> {
        let errors = validation::validate(session.draft());
        session.set_errors(errors.clone());
        if !errors.is_empty() {
            return Err(ContractWorkflowError::Validation(errors));
        }

        let Some(submission) = build_submission(session.draft(), session.binder()) else {
            // Unreachable after a clean validation pass; recompute the
            // error map rather than trusting screen state.
            return Err(ContractWorkflowError::Validation(validation::validate(
                session.draft(),
            )));
        };

        session.begin_submission()?;
        let outcome = self.repository.create_contract(submission);
        session.finish_submission();

        let record = outcome?;
        lifecycle::advance(ContractStage::Draft, record.stage)?;
        session.reset();
        Ok(record)
    }

    /// Loads the owner-side approval screen for a submitted contract.
    pub fn load_approval(&self, id: &ContractId) -> Result<ApprovalView, ContractWorkflowError> {
        let record = self
            .repository
            .fetch_contract(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(ApprovalView::from_record(record))
    }

    /// Finalizes the contract with the owner's freshly captured
    /// signature. A blank surface is refused before any repository call.
    pub fn approve(
        &self,
        id: &ContractId,
        pad: &SignaturePad,
    ) -> Result<ContractRecord, ContractWorkflowError> {
        if pad.is_blank() {
            return Err(ContractWorkflowError::BlankSignature);
        }

        let record = self
            .repository
            .fetch_contract(id)?
            .ok_or(RepositoryError::NotFound)?;
        lifecycle::advance(record.stage, ContractStage::Active)?;

        let image = pad.to_image()?;
        let updated = self.repository.approve_contract(id, image)?;
        Ok(updated)
    }
}

fn build_submission(draft: &ContractDraft, binder: &DocumentBinder) -> Option<ContractSubmission> {
    Some(ContractSubmission {
        tenant: draft.tenant.clone()?,
        property: draft.property.clone()?,
        lease: draft.lease.clone(),
        contract_type: draft.contract_type?,
        purpose: draft.purpose.clone(),
        start_date: draft.start_date?,
        end_date: draft.end_date,
        amount: draft.amount?,
        security_deposit: draft.security_deposit,
        payment_method: draft.payment_method,
        payment_frequency: draft.payment_frequency,
        specific_rules: draft.specific_rules.clone(),
        insurance_text: draft.insurance_text.clone(),
        notes: draft.notes.clone(),
        contract_files: binder.contract_files.clone(),
        identity_file: binder.identity_upload.clone(),
    })
}

/// Everything the owner-side approval screen renders: the summary of the
/// persisted contract, the tenant's signature carried verbatim, and
/// whether the stage still awaits the owner.
#[derive(Debug, Clone, Serialize)]
pub struct ApprovalView {
    pub contract_id: ContractId,
    pub stage: &'static str,
    pub tenant_name: String,
    pub property_address: String,
    pub monthly_rent: u32,
    pub contract_type: &'static str,
    pub purpose: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub security_deposit: Option<u32>,
    pub payment_method: Option<&'static str>,
    pub payment_frequency: Option<&'static str>,
    pub specific_rules: Option<String>,
    pub insurance_text: Option<String>,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_signature: Option<String>,
    pub awaiting_owner_approval: bool,
}

impl ApprovalView {
    pub fn from_record(record: ContractRecord) -> Self {
        let awaiting_owner_approval = record.stage == ContractStage::PendingOwnerApproval;
        Self {
            contract_id: record.id,
            stage: record.stage.label(),
            tenant_name: record.tenant_name,
            property_address: record.property_address,
            monthly_rent: record.monthly_rent,
            contract_type: record.contract_type.label(),
            purpose: record.purpose,
            start_date: record.start_date,
            end_date: record.end_date,
            security_deposit: record.security_deposit,
            payment_method: record.payment_method.map(|method| method.label()),
            payment_frequency: record.payment_frequency.map(|frequency| frequency.label()),
            specific_rules: record.specific_rules,
            insurance_text: record.insurance_text,
            notes: record.notes,
            tenant_signature: record.tenant_signature,
            owner_signature: record.owner_signature,
            awaiting_owner_approval,
        }
    }
}

/// Error raised by the contract desk.
#[derive(Debug, thiserror::Error)]
pub enum ContractWorkflowError {
    #[error("draft has validation errors")]
    Validation(BTreeMap<DraftField, String>),
    #[error("a submission is already in flight for this draft")]
    SubmissionInFlight,
    #[error("signature surface is blank; draw a signature before approving")]
    BlankSignature,
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Stage(#[from] StageError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
