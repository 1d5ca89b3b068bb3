//! Session authentication state machine

use std::fmt;

/// Where a session is in the logon sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No authorization on the current connection
    #[default]
    Unauthenticated,
    /// Application credentials accepted
    ApplicationAuthenticated,
    /// Trading account authorized; requests for the account are accepted
    AccountAuthenticated,
    /// A logon or refresh step failed; kept for inspection until the next
    /// logon or logout
    Faulted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::ApplicationAuthenticated => "application_authenticated",
            SessionState::AccountAuthenticated => "account_authenticated",
            SessionState::Faulted => "faulted",
        };
        f.write_str(name)
    }
}

/// Outcome of one sequencing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    ApplicationAuthorized,
    AccountAuthorized,
    StepFailed,
    LoggedOut,
}

/// Handle a state transition. Pure function: no I/O.
///
/// Account authorization only counts once the application is authorized;
/// re-authorizing the application keeps an authorized account.
pub fn transition(state: SessionState, event: SessionEvent) -> SessionState {
    match (state, event) {
        (_, SessionEvent::StepFailed) => SessionState::Faulted,
        (_, SessionEvent::LoggedOut) => SessionState::Unauthenticated,

        (SessionState::AccountAuthenticated, SessionEvent::ApplicationAuthorized) => {
            SessionState::AccountAuthenticated
        }
        (_, SessionEvent::ApplicationAuthorized) => SessionState::ApplicationAuthenticated,

        (
            SessionState::ApplicationAuthenticated | SessionState::AccountAuthenticated,
            SessionEvent::AccountAuthorized,
        ) => SessionState::AccountAuthenticated,
        (state, SessionEvent::AccountAuthorized) => state,
    }
}
