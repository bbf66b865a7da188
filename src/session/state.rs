//! Session loop state machine.

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// A raw command was requested at connect time; the loop never ran.
    Rejected,
    /// The client ended its input.
    Eof,
    /// Reading from or writing to the transport failed.
    Error,
    /// A command (or the session owner) requested termination.
    Cancelled,
}

/// Represents the state of a session's read-eval loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Blocked on the next line from the terminal.
    #[default]
    Reading,
    /// Splitting a line into arguments.
    Tokenizing,
    /// Running a command.
    Dispatching,
    /// The loop has exited and cannot be resumed.
    Closed(CloseReason),
}

impl SessionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Reading -> Tokenizing
    /// - Tokenizing -> Dispatching
    /// - Tokenizing -> Reading (blank line or parse error)
    /// - Dispatching -> Reading
    /// - any non-closed state -> Closed
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        match (*self, target) {
            (Closed(_), _) => false,
            (_, Closed(CloseReason::Rejected)) => false,
            (_, Closed(_)) => true,
            (Reading, Tokenizing)
            | (Tokenizing, Dispatching)
            | (Tokenizing, Reading)
            | (Dispatching, Reading) => true,
            _ => false,
        }
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: SessionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::ShellError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is a terminal state (no further transitions possible).
    pub fn is_closed(&self) -> bool {
        matches!(self, SessionState::Closed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cycle() {
        let mut state = SessionState::Reading;
        assert!(state.transition_to(SessionState::Tokenizing).is_ok());
        assert!(state.transition_to(SessionState::Dispatching).is_ok());
        assert!(state.transition_to(SessionState::Reading).is_ok());
        assert_eq!(state, SessionState::Reading);
    }

    #[test]
    fn test_blank_line_returns_to_reading() {
        let mut state = SessionState::Reading;
        state.transition_to(SessionState::Tokenizing).unwrap();
        assert!(state.transition_to(SessionState::Reading).is_ok());
    }

    #[test]
    fn test_invalid_reading_to_dispatching() {
        let mut state = SessionState::Reading;
        assert!(state.transition_to(SessionState::Dispatching).is_err());
        // State should remain unchanged
        assert_eq!(state, SessionState::Reading);
    }

    #[test]
    fn test_close_from_any_live_state() {
        for from in [
            SessionState::Reading,
            SessionState::Tokenizing,
            SessionState::Dispatching,
        ] {
            let mut state = from;
            assert!(state
                .transition_to(SessionState::Closed(CloseReason::Eof))
                .is_ok());
            assert!(state.is_closed());
        }
    }

    #[test]
    fn test_rejected_is_not_a_loop_exit() {
        let mut state = SessionState::Reading;
        assert!(state
            .transition_to(SessionState::Closed(CloseReason::Rejected))
            .is_err());
    }

    #[test]
    fn test_invalid_from_closed() {
        let mut state = SessionState::Closed(CloseReason::Cancelled);
        assert!(state.transition_to(SessionState::Reading).is_err());
        assert!(state
            .transition_to(SessionState::Closed(CloseReason::Error))
            .is_err());
    }

    #[test]
    fn test_default() {
        assert_eq!(SessionState::default(), SessionState::Reading);
    }
}
