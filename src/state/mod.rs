//! State module for tracking the login session
//!
//! # Components
//!
//! - `SessionState`: where the site session is in the login sequence

mod session_state;

pub use session_state::SessionState;
