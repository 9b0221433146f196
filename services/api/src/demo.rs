use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use crate::infra::InMemoryRecordRepository;
use rentflow::error::AppError;
use rentflow::workflows::contracts::{
    ContractDeskService, ContractType, ContractWorkflowError, DeskConfig, DraftSession,
    PaymentFrequency, Point, TenantId, UploadedFile,
};

// 1x1 transparent PNG, standing in for the signature the tenant drew on
// their own device.
const TENANT_SIGNATURE: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Contract start date (YYYY-MM-DD). Defaults to the seeded lease start.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) start_date: Option<NaiveDate>,
    /// Contract end date (YYYY-MM-DD). Defaults to the seeded lease end.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) end_date: Option<NaiveDate>,
    /// Optional identity document to attach to the submission.
    #[arg(long)]
    pub(crate) identity_file: Option<PathBuf>,
    /// Stop after submission instead of simulating signing and approval.
    #[arg(long)]
    pub(crate) skip_approval: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        start_date,
        end_date,
        identity_file,
        skip_approval,
    } = args;

    let repository = Arc::new(InMemoryRecordRepository::with_sample_records());
    let service = ContractDeskService::new(repository.clone(), DeskConfig::default());

    println!("Contract lifecycle demo");

    let directory = service.directory().map_err(AppError::from)?;
    println!(
        "- Loaded {} tenants, {} properties, {} leases from the record store",
        directory.tenants.len(),
        directory.properties.len(),
        directory.leases.len()
    );

    let mut session = DraftSession::new();
    let tenant_id = TenantId("t-001".to_string());
    service
        .select_tenant(&mut session, &directory, &tenant_id)
        .map_err(AppError::from)?;

    let draft = session.draft();
    println!("\nSelection cascade for tenant t-001:");
    println!(
        "- Property: {}",
        draft.property_address.as_deref().unwrap_or("(none)")
    );
    println!(
        "- Monthly rent: {}",
        draft
            .amount
            .map(|amount| amount.to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!(
        "- Period: {} to {}",
        draft
            .start_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "(open)".to_string()),
        draft
            .end_date
            .map(|date| date.to_string())
            .unwrap_or_else(|| "(open)".to_string()),
    );
    println!(
        "- Supporting documents: {} tenant, {} property",
        session.binder().tenant_docs.len(),
        session.binder().property_docs.len()
    );

    session.edit(|draft| {
        draft.contract_type = Some(ContractType::Residential);
        draft.payment_frequency = Some(PaymentFrequency::Monthly);
        draft.purpose = Some("Primary residence".to_string());
        if start_date.is_some() {
            draft.start_date = start_date;
        }
        if end_date.is_some() {
            draft.end_date = end_date;
        }
    });

    if let Some(path) = identity_file {
        let bytes = std::fs::read(&path)?;
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "identity-document".to_string());
        let upload = UploadedFile::new(file_name, content_type, bytes)
            .map_err(ContractWorkflowError::from)
            .map_err(AppError::from)?;
        service
            .attach_identity(&mut session, upload)
            .map_err(AppError::from)?;
        println!("- Attached identity document from disk");
    }

    let record = service.submit(&mut session).map_err(AppError::from)?;
    println!("\nSubmitted contract {}:", record.id.0);
    println!("- Stage: {}", record.stage.label());
    println!(
        "- {} at {} / month for {}",
        record.property_address, record.monthly_rent, record.tenant_name
    );

    if skip_approval {
        return Ok(());
    }

    repository.record_tenant_signature(&record.id, TENANT_SIGNATURE);
    let view = service.load_approval(&record.id).map_err(AppError::from)?;
    println!("\nTenant signed; approval screen shows:");
    println!("- Stage: {}", view.stage);
    println!(
        "- Tenant signature present: {}",
        view.tenant_signature.is_some()
    );

    // A blank pad is refused locally, before any record-store call.
    let blank = service.blank_pad().map_err(AppError::from)?;
    match service.approve(&record.id, &blank) {
        Err(ContractWorkflowError::BlankSignature) => {
            println!("- Blank signature refused: draw before approving");
        }
        Ok(_) => println!("- Unexpected: blank signature accepted"),
        Err(other) => return Err(AppError::from(other)),
    }

    let mut pad = service.blank_pad().map_err(AppError::from)?;
    pad.pointer_down(Point { x: 40.0, y: 60.0 });
    pad.pointer_move(Point { x: 120.0, y: 100.0 });
    pad.pointer_move(Point { x: 210.0, y: 50.0 });
    pad.pointer_move(Point { x: 300.0, y: 90.0 });
    pad.pointer_up();
    pad.pointer_down(Point { x: 330.0, y: 70.0 });
    pad.pointer_move(Point { x: 400.0, y: 80.0 });
    pad.pointer_up();

    let approved = service.approve(&record.id, &pad).map_err(AppError::from)?;
    println!("\nOwner approved with a drawn signature:");
    println!("- Stage: {}", approved.stage.label());
    println!(
        "- Owner signature bytes (base64): {}",
        approved
            .owner_signature
            .as_deref()
            .map(str::len)
            .unwrap_or(0)
    );

    Ok(())
}
