use serde::{Deserialize, Serialize};

/// Lifecycle stage of a contract. The happy path is a straight line from
/// `Draft` to `Active`; `Rejected` and `Failed` are terminal offshoots
/// reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStage {
    Draft,
    PendingTenantSignature,
    PendingOwnerApproval,
    Active,
    Rejected,
    Failed,
}

impl ContractStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::PendingTenantSignature => "Pending tenant signature",
            Self::PendingOwnerApproval => "Pending owner approval",
            Self::Active => "Active",
            Self::Rejected => "Rejected",
            Self::Failed => "Failed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Active | Self::Rejected | Self::Failed)
    }

    /// The explicit transition table. Everything not listed here is
    /// illegal, including any move out of a terminal stage.
    pub const fn allows(self, next: Self) -> bool {
        match (self, next) {
            (Self::Draft, Self::PendingTenantSignature) => true,
            (Self::PendingTenantSignature, Self::PendingOwnerApproval) => true,
            (Self::PendingOwnerApproval, Self::Active) => true,
            (from, Self::Rejected | Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

/// Checks a stage move against the transition table. A repository failure
/// never reaches this point; callers only advance after the remote call
/// succeeded, so a refused transition always reflects screen state that
/// went stale.
pub fn advance(current: ContractStage, next: ContractStage) -> Result<ContractStage, StageError> {
    if current.allows(next) {
        Ok(next)
    } else {
        Err(StageError::IllegalTransition {
            from: current,
            to: next,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("contract cannot move from {} to {}", from.label(), to.label())]
    IllegalTransition {
        from: ContractStage,
        to: ContractStage,
    },
}
