// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use crate::models::{AppointmentError, BookingState};

/// Tracks one booking attempt through its states.
#[derive(Debug, Clone)]
pub struct BookingLifecycle {
    state: BookingState,
    history: Vec<BookingState>,
}

impl Default for BookingLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingLifecycle {
    pub fn new() -> Self {
        Self {
            state: BookingState::Requested,
            history: vec![BookingState::Requested],
        }
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn history(&self) -> &[BookingState] {
        &self.history
    }

    /// All valid next states for a given state.
    pub fn valid_transitions(state: BookingState) -> &'static [BookingState] {
        match state {
            BookingState::Requested => &[BookingState::Validating, BookingState::Rejected],
            BookingState::Validating => &[BookingState::SlotReserved, BookingState::Rejected],
            BookingState::SlotReserved => &[BookingState::PatientResolved, BookingState::Rejected],
            BookingState::PatientResolved => &[BookingState::Committed, BookingState::Rejected],
            // Terminal states
            BookingState::Committed | BookingState::Rejected => &[],
        }
    }

    pub fn advance(&mut self, to: BookingState) -> Result<(), AppointmentError> {
        if !Self::valid_transitions(self.state).contains(&to) {
            warn!("Invalid booking transition attempted: {} -> {}", self.state, to);
            return Err(AppointmentError::InvalidStateTransition { from: self.state, to });
        }

        debug!("Booking transition: {} -> {}", self.state, to);
        self.state = to;
        self.history.push(to);
        Ok(())
    }

    /// Moves a non-terminal attempt to `Rejected`.
    pub fn reject(&mut self, reason: &AppointmentError) {
        if Self::valid_transitions(self.state).contains(&BookingState::Rejected) {
            warn!("Booking rejected while {} ({}): {}", self.state, reason.kind(), reason);
            self.state = BookingState::Rejected;
            self.history.push(BookingState::Rejected);
        }
    }
}
