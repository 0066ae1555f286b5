/// Login session state definitions
///
/// The session walks `Anonymous -> AgeVerified -> Authenticated`; any failure
/// during login lands in `LoginFailed`. Only `Authenticated` admits listing
/// and detail requests.
use std::fmt;

/// Represents where the site session is in the login sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// No cookies yet, or the session was reset
    #[default]
    Anonymous,

    /// Home page and age-gate click-through have been fetched
    AgeVerified,

    /// Credentials accepted; protected pages are reachable
    Authenticated,

    /// Login was attempted and rejected
    LoginFailed,
}

impl SessionState {
    /// Returns true if listing and detail requests are allowed
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// Resetting to `Anonymous` is always allowed so a new login can start.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (*self, next),
            (Anonymous, AgeVerified)
                | (Anonymous, LoginFailed)
                | (AgeVerified, Authenticated)
                | (AgeVerified, LoginFailed)
                | (_, Anonymous)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::AgeVerified => "age_verified",
            Self::Authenticated => "authenticated",
            Self::LoginFailed => "login_failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
