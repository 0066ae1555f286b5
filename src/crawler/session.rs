//! Login session management
//!
//! Logging in is a fixed four-request sequence:
//!
//! 1. GET the home page (session cookie)
//! 2. GET the age gate (adult verification)
//! 3. POST the credential form
//! 4. GET a protected page and check it is not the login/age-gate page
//!
//! The site answers a bad login with a normal 200 page, so success can only
//! be inferred from step 4. The same body heuristics detect a session that
//! lapses mid-run.

use crate::config::SiteConfig;
use crate::crawler::fetcher::Fetcher;
use crate::credentials::Credentials;
use crate::state::SessionState;
use crate::{Result, ScraperError};
use std::sync::RwLock;

/// Body heuristics for login and expiry detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProbe {
    age_gate_marker: String,
    redirect_marker: String,
    login_marker: String,
}

impl SessionProbe {
    pub fn new(
        age_gate_marker: impl Into<String>,
        redirect_marker: impl Into<String>,
        login_marker: impl Into<String>,
    ) -> Self {
        Self {
            age_gate_marker: age_gate_marker.into(),
            redirect_marker: redirect_marker.into(),
            login_marker: login_marker.into().to_lowercase(),
        }
    }

    pub fn from_site(site: &SiteConfig) -> Self {
        Self::new(
            &site.age_gate_marker,
            &site.redirect_marker,
            &site.login_marker,
        )
    }

    /// True if a detail response is really an expiry redirect
    pub fn is_expired_detail(&self, html: &str) -> bool {
        contains_marker(html, &self.age_gate_marker) || contains_marker(html, &self.redirect_marker)
    }

    /// True if the protected page probed after login is the login page
    ///
    /// The login marker is matched case-insensitively.
    pub fn is_login_page(&self, html: &str) -> bool {
        contains_marker(html, &self.age_gate_marker)
            || (!self.login_marker.is_empty() && html.to_lowercase().contains(&self.login_marker))
    }
}

impl Default for SessionProbe {
    fn default() -> Self {
        Self::from_site(&SiteConfig::default())
    }
}

fn contains_marker(html: &str, marker: &str) -> bool {
    !marker.is_empty() && html.contains(marker)
}

/// Tracks the session state and drives the login sequence
///
/// The state sits behind a lock so detail scrapes running concurrently can
/// check it through a shared reference. The lock is never held across an
/// await point.
#[derive(Debug, Default)]
pub struct SessionManager {
    state: RwLock<SessionState>,
    probe: SessionProbe,
}

impl SessionManager {
    pub fn new(probe: SessionProbe) -> Self {
        Self {
            state: RwLock::new(SessionState::Anonymous),
            probe,
        }
    }

    pub fn probe(&self) -> &SessionProbe {
        &self.probe
    }

    pub fn state(&self) -> SessionState {
        self.state.read().map(|s| *s).unwrap_or_else(|e| *e.into_inner())
    }

    /// Moves to `next`, rejecting steps the state machine does not allow
    pub fn transition(&self, next: SessionState) -> Result<()> {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        let current = *guard;
        if current == next {
            return Ok(());
        }
        if !current.can_transition_to(next) {
            return Err(ScraperError::InvalidTransition {
                from: current,
                to: next,
            });
        }
        tracing::debug!("Session {} -> {}", current, next);
        *guard = next;
        Ok(())
    }

    /// Forgets the session so a fresh login can start
    pub fn reset(&self) {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        *guard = SessionState::Anonymous;
    }

    /// Fails with `SessionExpired` unless a login has succeeded
    pub fn ensure_authenticated(&self) -> Result<()> {
        if self.state().is_authenticated() {
            Ok(())
        } else {
            Err(ScraperError::SessionExpired(
                "Not logged in. Call login() first.".to_string(),
            ))
        }
    }

    /// Checks a detail response for expiry markers
    ///
    /// On expiry the session is reset to `Anonymous` and `SessionExpired`
    /// is returned.
    pub fn check_detail(&self, url: &str, html: &str) -> Result<()> {
        if self.probe.is_expired_detail(html) {
            self.reset();
            return Err(ScraperError::SessionExpired(format!(
                "Session expired during scraping ({})",
                url
            )));
        }
        Ok(())
    }

    /// Runs the login sequence
    ///
    /// Credentials are validated before any request is sent. Every failure,
    /// network errors included, is reported as [`ScraperError::Login`] and
    /// leaves the session in `LoginFailed`.
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Fetch layer whose client keeps the session cookies
    /// * `site` - Endpoint paths and form field names
    /// * `credentials` - Account to log in with
    pub async fn login(
        &self,
        fetcher: &Fetcher,
        site: &SiteConfig,
        credentials: &Credentials,
    ) -> Result<()> {
        if self.state() != SessionState::Anonymous {
            self.reset();
        }

        if let Err(e) = credentials.validate() {
            self.transition(SessionState::LoginFailed)?;
            return Err(e);
        }

        tracing::info!("Logging in as {}...", credentials.username());

        match self.login_sequence(fetcher, site, credentials).await {
            Ok(()) => {
                self.transition(SessionState::Authenticated)?;
                tracing::info!("Login successful!");
                Ok(())
            }
            Err(e) => {
                self.transition(SessionState::LoginFailed)?;
                Err(match e {
                    ScraperError::Login(_) => e,
                    ScraperError::Network { .. } => {
                        ScraperError::Login(format!("Login failed due to network error: {}", e))
                    }
                    other => ScraperError::Login(format!("Login failed: {}", other)),
                })
            }
        }
    }

    async fn login_sequence(
        &self,
        fetcher: &Fetcher,
        site: &SiteConfig,
        credentials: &Credentials,
    ) -> Result<()> {
        fetcher.get(&site.endpoint(&site.home_path)).await?;

        fetcher.get(&site.endpoint(&site.age_gate_path)).await?;
        self.transition(SessionState::AgeVerified)?;

        let form = [
            (site.username_field.as_str(), credentials.username()),
            (site.password_field.as_str(), credentials.password()),
        ];
        fetcher
            .post_form(&site.endpoint(&site.login_path), &form)
            .await?;

        let probe_html = fetcher.get(&site.endpoint(&site.listing_path)).await?;
        if self.probe.is_login_page(&probe_html) {
            return Err(ScraperError::Login(
                "Login failed - redirected to login page".to_string(),
            ));
        }

        Ok(())
    }
}
