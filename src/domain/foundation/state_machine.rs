//! Lifecycle transitions for status enums.

use super::ValidationError;

/// A status enum whose legal moves are a fixed edge list.
///
/// Implementors only name the states reachable from each state; checking,
/// performing and terminal detection derive from that list.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    /// States reachable in one step from `self`.
    fn next_states(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.next_states().contains(target)
    }

    /// Returns `target` if the edge exists.
    ///
    /// # Errors
    ///
    /// `InvalidFormat` on the `state_transition` field naming both states.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        Err(ValidationError::invalid_format(
            "state_transition",
            format!("Cannot transition from {:?} to {:?}", self, target),
        ))
    }

    fn is_terminal(&self) -> bool {
        self.next_states().is_empty()
    }
}
