use crate::error::SigningError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    AwaitingSignature,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorAction {
    /// A batch with a non-empty session id appeared in the store.
    BatchArrived,
    Fail,
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: CoordinatorState,
    pub to: CoordinatorState,
    pub reason: &'static str,
}

pub fn coordinator_transition(
    from: CoordinatorState,
    action: CoordinatorAction,
) -> Result<(CoordinatorState, StateTransition), SigningError> {
    use CoordinatorAction as A;
    use CoordinatorState as S;

    let (to, reason) = match (from, action) {
        (_, A::BatchArrived) => (S::AwaitingSignature, "batch_arrived"),
        (S::AwaitingSignature, A::Fail) => (S::Cancelled, "signing_failed"),
        (_, A::Close) => (S::Idle, "modal_closed"),
        (from, action) => {
            return Err(SigningError::IllegalTransition {
                from: format!("{from:?}"),
                action: format!("{action:?}"),
            })
        }
    };
    Ok((to, StateTransition { from, to, reason }))
}
