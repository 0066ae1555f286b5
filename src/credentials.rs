//! Credential provider
//!
//! Login credentials are never stored in configuration files. They come from
//! the command line or from `QUEENALBA_USERNAME` / `QUEENALBA_PASSWORD`
//! (a `.env` file is honored by the binary through `dotenvy`).

use crate::ScraperError;
use std::fmt;

pub const ENV_USERNAME: &str = "QUEENALBA_USERNAME";
pub const ENV_PASSWORD: &str = "QUEENALBA_PASSWORD";

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 4;

/// A username/password pair for the site login form
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Checks the format rules enforced before any login request is sent
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Username has at least 3 and password at least 4 characters
    /// * `Err(ScraperError::Login)` - Either value is too short
    pub fn validate(&self) -> Result<(), ScraperError> {
        if self.username.chars().count() < MIN_USERNAME_LEN {
            return Err(ScraperError::Login(format!(
                "Invalid credentials format: username must be at least {} characters",
                MIN_USERNAME_LEN
            )));
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ScraperError::Login(format!(
                "Invalid credentials format: password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
