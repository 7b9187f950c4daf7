//! Membership state machine - Transizioni ammesse per la coppia (utente, carpool)
//!
//! Funzioni pure: dato lo stato corrente e la transizione richiesta calcolano
//! il passo successivo senza toccare il carpool. L'applicazione del passo
//! (modifica degli insiemi e bump della revisione) è in `Carpool::apply_transition`.

use super::enums::{MembershipState, Transition};
use std::fmt;

/// Esito di una transizione valida
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Lo stato cambia: il carpool va modificato e la revisione incrementata
    Move(MembershipState),
    /// Richiesta ripetuta mentre si è già nello stato di arrivo (doppio tap, retry di rete)
    Unchanged(MembershipState),
}

impl Step {
    pub fn state(&self) -> MembershipState {
        match self {
            Step::Move(state) | Step::Unchanged(state) => *state,
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(self, Step::Move(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: MembershipState,
    pub transition: Transition,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} from state {}", self.transition, self.from)
    }
}

impl std::error::Error for TransitionError {}

/// Calcola il passo successivo per un utente che NON è l'owner del carpool.
///
/// - NONE -> PENDING con `Join`
/// - PENDING -> NONE con `Cancel` o `Decline`
/// - PENDING -> MEMBER con `Approve`
/// - MEMBER -> NONE con `Leave`
///
/// `Join` da PENDING, `Approve` da MEMBER e `Cancel` da NONE sono no-op
/// (il retry di un annullamento già riuscito). `Leave` e `Decline` da NONE
/// restano invalide.
pub fn next_state(
    current: MembershipState,
    transition: Transition,
) -> Result<Step, TransitionError> {
    use MembershipState::*;
    use Transition::*;

    match (current, transition) {
        (None, Join) => Ok(Step::Move(Pending)),
        (Pending, Join) => Ok(Step::Unchanged(Pending)),

        (Pending, Cancel) | (Pending, Decline) => Ok(Step::Move(None)),
        (None, Cancel) => Ok(Step::Unchanged(None)),

        (Pending, Approve) => Ok(Step::Move(Member)),
        (Member, Approve) => Ok(Step::Unchanged(Member)),

        (Member, Leave) => Ok(Step::Move(None)),

        (from, transition) => Err(TransitionError { from, transition }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MembershipState::*;

    #[test]
    fn join_then_cancel_returns_to_none() {
        let pending = next_state(None, Transition::Join).unwrap();
        assert_eq!(pending, Step::Move(Pending));
        let back = next_state(pending.state(), Transition::Cancel).unwrap();
        assert_eq!(back, Step::Move(None));
    }

    #[test]
    fn repeated_join_is_a_no_op() {
        assert_eq!(
            next_state(Pending, Transition::Join).unwrap(),
            Step::Unchanged(Pending)
        );
    }

    #[test]
    fn repeated_approve_is_a_no_op() {
        let step = next_state(Member, Transition::Approve).unwrap();
        assert!(!step.is_change());
        assert_eq!(step.state(), Member);
    }

    #[test]
    fn repeated_cancel_is_a_no_op() {
        let step = next_state(None, Transition::Cancel).unwrap();
        assert_eq!(step, Step::Unchanged(None));
        assert!(!step.is_change());
    }

    #[test]
    fn leave_from_none_is_invalid() {
        let err = next_state(None, Transition::Leave).unwrap_err();
        assert_eq!(err.from, None);
        assert_eq!(err.transition, Transition::Leave);
        assert_eq!(err.to_string(), "cannot leave from state NONE");
    }

    #[test]
    fn invalid_pairs_are_rejected() {
        let invalid = [
            (None, Transition::Approve),
            (None, Transition::Decline),
            (Pending, Transition::Leave),
            (Member, Transition::Join),
            (Member, Transition::Cancel),
            (Member, Transition::Decline),
        ];
        for (from, transition) in invalid {
            assert!(
                next_state(from, transition).is_err(),
                "{} from {} should be rejected",
                transition,
                from
            );
        }
    }

    #[test]
    fn full_lifecycle() {
        let mut state = None;
        for (transition, expected) in [
            (Transition::Join, Pending),
            (Transition::Approve, Member),
            (Transition::Leave, None),
        ] {
            let step = next_state(state, transition).unwrap();
            assert!(step.is_change());
            state = step.state();
            assert_eq!(state, expected);
        }
    }
}
