//! # Comparison lifecycle
//!
//! `draft -> submitted -> approved | rejected`. Approved and rejected are
//! terminal. Only drafts may be edited; deleting a non-draft comparison is
//! reserved for admins.

use thiserror::Error;

use crate::models::{ComparisonStatus, Role};
use crate::permissions;

/// A requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Submit,
    Approve,
    Reject,
}

impl Transition {
    /// State reached when the transition succeeds.
    pub fn target(self) -> ComparisonStatus {
        match self {
            Transition::Submit => ComparisonStatus::Submitted,
            Transition::Approve => ComparisonStatus::Approved,
            Transition::Reject => ComparisonStatus::Rejected,
        }
    }

    /// State the comparison must be in for the transition to apply.
    pub fn source(self) -> ComparisonStatus {
        match self {
            Transition::Submit => ComparisonStatus::Draft,
            Transition::Approve | Transition::Reject => ComparisonStatus::Submitted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Only makers and admins can submit comparisons")]
    SubmitNotPermitted,
    #[error("Only checkers and admins can approve comparisons")]
    ApproveNotPermitted,
    #[error("Only checkers and admins can reject comparisons")]
    RejectNotPermitted,
    #[error("Rejection reason is required")]
    MissingRejectionReason,
    #[error("Only draft comparisons can be submitted")]
    NotDraft,
    #[error("Only submitted comparisons can be approved")]
    NotSubmittedForApproval,
    #[error("Only submitted comparisons can be rejected")]
    NotSubmittedForRejection,
    #[error("Only draft comparisons can be edited")]
    NotEditable,
    #[error("Only draft comparisons can be deleted")]
    NotDeletable,
}

impl LifecycleError {
    /// Role failures are authorization errors; everything else is a
    /// validation error.
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            LifecycleError::SubmitNotPermitted
                | LifecycleError::ApproveNotPermitted
                | LifecycleError::RejectNotPermitted
        )
    }
}

/// Checks the caller's role for a transition. Runs before the comparison is
/// loaded, so a maker approving a missing comparison still gets 403.
pub fn authorize_transition(role: Role, transition: Transition) -> Result<(), LifecycleError> {
    match transition {
        Transition::Submit if !permissions::can_submit_comparison(role) => {
            Err(LifecycleError::SubmitNotPermitted)
        }
        Transition::Approve if !permissions::can_review_comparison(role) => {
            Err(LifecycleError::ApproveNotPermitted)
        }
        Transition::Reject if !permissions::can_review_comparison(role) => {
            Err(LifecycleError::RejectNotPermitted)
        }
        _ => Ok(()),
    }
}

/// Trims the rejection reason and rejects blank input.
pub fn rejection_reason(reason: Option<&str>) -> Result<String, LifecycleError> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .ok_or(LifecycleError::MissingRejectionReason)
}

/// Validates the current status and returns the next one.
pub fn apply(
    current: ComparisonStatus,
    transition: Transition,
) -> Result<ComparisonStatus, LifecycleError> {
    if current != transition.source() {
        return Err(match transition {
            Transition::Submit => LifecycleError::NotDraft,
            Transition::Approve => LifecycleError::NotSubmittedForApproval,
            Transition::Reject => LifecycleError::NotSubmittedForRejection,
        });
    }
    Ok(transition.target())
}

pub fn ensure_editable(current: ComparisonStatus) -> Result<(), LifecycleError> {
    if current == ComparisonStatus::Draft {
        Ok(())
    } else {
        Err(LifecycleError::NotEditable)
    }
}

pub fn ensure_deletable(current: ComparisonStatus, role: Role) -> Result<(), LifecycleError> {
    if current == ComparisonStatus::Draft || role == Role::Admin {
        Ok(())
    } else {
        Err(LifecycleError::NotDeletable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ComparisonStatus::*;

    const ALL: [ComparisonStatus; 4] = [Draft, Submitted, Approved, Rejected];

    #[test]
    fn submit_only_from_draft() {
        for status in ALL {
            let result = apply(status, Transition::Submit);
            if status == Draft {
                assert_eq!(result, Ok(Submitted));
            } else {
                assert_eq!(result, Err(LifecycleError::NotDraft));
            }
        }
    }

    #[test]
    fn review_only_from_submitted() {
        for status in ALL {
            let approve = apply(status, Transition::Approve);
            let reject = apply(status, Transition::Reject);
            if status == Submitted {
                assert_eq!(approve, Ok(Approved));
                assert_eq!(reject, Ok(Rejected));
            } else {
                assert!(approve.is_err());
                assert!(reject.is_err());
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in [Approved, Rejected] {
            assert!(status.is_terminal());
            for transition in [Transition::Submit, Transition::Approve, Transition::Reject] {
                assert!(apply(status, transition).is_err());
            }
        }
    }

    #[test]
    fn maker_can_never_review() {
        let err = authorize_transition(Role::Maker, Transition::Approve).unwrap_err();
        assert!(err.is_forbidden());
        let err = authorize_transition(Role::Maker, Transition::Reject).unwrap_err();
        assert!(err.is_forbidden());
        assert!(authorize_transition(Role::Checker, Transition::Approve).is_ok());
        assert!(authorize_transition(Role::Admin, Transition::Reject).is_ok());
    }

    #[test]
    fn checker_cannot_submit() {
        assert_eq!(
            authorize_transition(Role::Checker, Transition::Submit),
            Err(LifecycleError::SubmitNotPermitted)
        );
        assert!(authorize_transition(Role::Maker, Transition::Submit).is_ok());
        assert!(authorize_transition(Role::Admin, Transition::Submit).is_ok());
    }

    #[test]
    fn rejection_reason_must_not_be_blank() {
        assert_eq!(rejection_reason(None), Err(LifecycleError::MissingRejectionReason));
        assert_eq!(rejection_reason(Some("")), Err(LifecycleError::MissingRejectionReason));
        assert_eq!(rejection_reason(Some("   ")), Err(LifecycleError::MissingRejectionReason));
        assert_eq!(rejection_reason(Some(" too high ")), Ok("too high".to_string()));
        assert!(!LifecycleError::MissingRejectionReason.is_forbidden());
    }

    #[test]
    fn only_drafts_are_editable() {
        assert!(ensure_editable(Draft).is_ok());
        for status in [Submitted, Approved, Rejected] {
            assert_eq!(ensure_editable(status), Err(LifecycleError::NotEditable));
        }
    }

    #[test]
    fn admins_may_delete_in_any_state() {
        for status in ALL {
            assert!(ensure_deletable(status, Role::Admin).is_ok());
        }
        assert!(ensure_deletable(Draft, Role::Maker).is_ok());
        assert_eq!(
            ensure_deletable(Approved, Role::Checker),
            Err(LifecycleError::NotDeletable)
        );
    }
}
