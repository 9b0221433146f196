use crate::workflows::contracts::lifecycle::{advance, ContractStage, StageError};

const STAGES: [ContractStage; 6] = [
    ContractStage::Draft,
    ContractStage::PendingTenantSignature,
    ContractStage::PendingOwnerApproval,
    ContractStage::Active,
    ContractStage::Rejected,
    ContractStage::Failed,
];

#[test]
fn happy_path_advances_stage_by_stage() {
    let submitted = advance(
        ContractStage::Draft,
        ContractStage::PendingTenantSignature,
    )
    .expect("draft submits");
    let signed = advance(submitted, ContractStage::PendingOwnerApproval).expect("tenant signs");
    let active = advance(signed, ContractStage::Active).expect("owner approves");
    assert_eq!(active, ContractStage::Active);
}

#[test]
fn failure_offshoots_are_reachable_from_any_open_stage() {
    for stage in [
        ContractStage::Draft,
        ContractStage::PendingTenantSignature,
        ContractStage::PendingOwnerApproval,
    ] {
        assert!(stage.allows(ContractStage::Rejected));
        assert!(stage.allows(ContractStage::Failed));
    }
}

#[test]
fn terminal_stages_admit_no_transition() {
    for terminal in [
        ContractStage::Active,
        ContractStage::Rejected,
        ContractStage::Failed,
    ] {
        for next in STAGES {
            assert!(!terminal.allows(next), "{terminal:?} -> {next:?}");
        }
    }
}

#[test]
fn skipping_a_stage_is_illegal() {
    assert!(!ContractStage::Draft.allows(ContractStage::PendingOwnerApproval));
    assert!(!ContractStage::Draft.allows(ContractStage::Active));
    assert!(!ContractStage::PendingTenantSignature.allows(ContractStage::Active));
}

#[test]
fn moving_backwards_is_illegal() {
    assert!(!ContractStage::Active.allows(ContractStage::Draft));
    assert!(!ContractStage::PendingOwnerApproval.allows(ContractStage::PendingTenantSignature));
}

#[test]
fn advance_reports_both_ends_of_a_refused_move() {
    match advance(ContractStage::Active, ContractStage::Draft) {
        Err(StageError::IllegalTransition { from, to }) => {
            assert_eq!(from, ContractStage::Active);
            assert_eq!(to, ContractStage::Draft);
        }
        other => panic!("expected illegal transition, got {other:?}"),
    }
}
