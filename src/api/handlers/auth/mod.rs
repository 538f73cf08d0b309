//! Caller authentication for bearer-protected routes.

pub mod principal;
pub mod state;

pub use principal::{require_auth, Principal};
pub use state::{AuthConfig, AuthState};
