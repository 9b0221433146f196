use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::documents::UploadedFile;
use super::domain::{
    ContractId, ContractType, LeaseId, PaymentFrequency, PaymentMethod, PropertyId, TenantId,
};
use super::repository::{RecordRepository, RepositoryError};
use super::service::{ContractDeskService, ContractWorkflowError, DraftSession};
use super::signature::{Point, SignaturePad};

/// Router builder exposing the submission and approval endpoints of the
/// contract desk.
pub fn contract_router<R>(service: Arc<ContractDeskService<R>>) -> Router
where
    R: RecordRepository + 'static,
{
    Router::new()
        .route("/api/v1/contracts", post(create_handler::<R>))
        .route(
            "/api/v1/contracts/:contract_id",
            get(approval_view_handler::<R>),
        )
        .route(
            "/api/v1/contracts/:contract_id/approval",
            post(approve_handler::<R>),
        )
        .with_state(service)
}

/// Creation payload as the browsing session assembled it. Every field is
/// optional so the draft validator, not the deserializer, decides what a
/// submittable draft looks like.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateContractRequest {
    pub(crate) tenant: Option<String>,
    pub(crate) property: Option<String>,
    pub(crate) lease: Option<String>,
    pub(crate) contract_type: Option<ContractType>,
    pub(crate) purpose: Option<String>,
    pub(crate) start_date: Option<NaiveDate>,
    pub(crate) end_date: Option<NaiveDate>,
    pub(crate) amount: Option<u32>,
    pub(crate) security_deposit: Option<u32>,
    pub(crate) payment_method: Option<PaymentMethod>,
    pub(crate) payment_frequency: Option<PaymentFrequency>,
    pub(crate) specific_rules: Option<String>,
    pub(crate) insurance_text: Option<String>,
    pub(crate) notes: Option<String>,
    #[serde(default)]
    pub(crate) contract_files: Vec<FilePayload>,
    pub(crate) identity_file: Option<FilePayload>,
}

/// One transported file attachment, base64 over JSON.
#[derive(Debug, Deserialize)]
pub(crate) struct FilePayload {
    pub(crate) file_name: String,
    pub(crate) content_type: String,
    pub(crate) data: String,
}

impl FilePayload {
    fn decode(self) -> Result<UploadedFile, Response> {
        let bytes = STANDARD.decode(&self.data).map_err(|err| {
            let payload = json!({
                "error": format!("attachment '{}' is not valid base64: {err}", self.file_name),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        })?;
        UploadedFile::new(self.file_name, self.content_type, bytes)
            .map_err(|err| upload_rejection(&err))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApprovalRequest {
    pub(crate) strokes: Vec<Vec<Point>>,
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<ContractDeskService<R>>>,
    axum::Json(request): axum::Json<CreateContractRequest>,
) -> Response
where
    R: RecordRepository + 'static,
{
    let mut session = DraftSession::new();

    let CreateContractRequest {
        tenant,
        property,
        lease,
        contract_type,
        purpose,
        start_date,
        end_date,
        amount,
        security_deposit,
        payment_method,
        payment_frequency,
        specific_rules,
        insurance_text,
        notes,
        contract_files,
        identity_file,
    } = request;

    session.edit(|draft| {
        draft.tenant = tenant.map(TenantId);
        draft.property = property.map(PropertyId);
        draft.lease = lease.map(LeaseId);
        draft.contract_type = contract_type;
        draft.purpose = purpose;
        draft.start_date = start_date;
        draft.end_date = end_date;
        draft.amount = amount;
        draft.security_deposit = security_deposit;
        draft.payment_method = payment_method;
        draft.payment_frequency = payment_frequency;
        draft.specific_rules = specific_rules;
        draft.insurance_text = insurance_text;
        draft.notes = notes;
    });

    for payload in contract_files {
        let file = match payload.decode() {
            Ok(file) => file,
            Err(response) => return response,
        };
        if let Err(error) = service.attach_contract_file(&mut session, file) {
            return workflow_error_response(error);
        }
    }
    if let Some(payload) = identity_file {
        let file = match payload.decode() {
            Ok(file) => file,
            Err(response) => return response,
        };
        if let Err(error) = service.attach_identity(&mut session, file) {
            return workflow_error_response(error);
        }
    }

    match service.submit(&mut session) {
        Ok(record) => {
            (StatusCode::CREATED, axum::Json(record.status_view())).into_response()
        }
        Err(error) => workflow_error_response(error),
    }
}

pub(crate) async fn approval_view_handler<R>(
    State(service): State<Arc<ContractDeskService<R>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    R: RecordRepository + 'static,
{
    let id = ContractId(contract_id);
    match service.load_approval(&id) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => workflow_error_response(error),
    }
}

pub(crate) async fn approve_handler<R>(
    State(service): State<Arc<ContractDeskService<R>>>,
    Path(contract_id): Path<String>,
    axum::Json(request): axum::Json<ApprovalRequest>,
) -> Response
where
    R: RecordRepository + 'static,
{
    let id = ContractId(contract_id);
    let config = service.config();
    let pad = match SignaturePad::from_strokes(
        config.signature_width,
        config.signature_height,
        request.strokes,
    ) {
        Ok(pad) => pad,
        Err(error) => return workflow_error_response(error.into()),
    };

    match service.approve(&id, &pad) {
        Ok(record) => (StatusCode::OK, axum::Json(record.status_view())).into_response(),
        Err(error) => workflow_error_response(error),
    }
}

fn upload_rejection(error: &super::documents::UploadError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

/// Maps each workflow failure onto the status the screen distinguishes:
/// field-level rejections stay editable (422), stale or duplicate actions
/// conflict (409), an unreachable record store is a retry (502).
fn workflow_error_response(error: ContractWorkflowError) -> Response {
    match error {
        ContractWorkflowError::Validation(errors) => {
            let payload = json!({ "errors": errors });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ContractWorkflowError::Repository(RepositoryError::Rejected { field_errors }) => {
            let payload = json!({ "errors": field_errors });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ContractWorkflowError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "contract not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        ContractWorkflowError::Repository(RepositoryError::Unavailable(reason)) => {
            let payload = json!({
                "error": format!("record store unreachable: {reason}"),
                "retry": true,
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        ContractWorkflowError::BlankSignature => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ContractWorkflowError::SubmissionInFlight | ContractWorkflowError::Stage(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ContractWorkflowError::Upload(_) | ContractWorkflowError::Signature(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}
