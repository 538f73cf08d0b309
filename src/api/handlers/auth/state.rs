//! Shared auth state: token signer plus runtime switches.

use crate::credentials::TokenSigner;

#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    enforce_ownership: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject cross-user profile reads and post mutations with 403.
    #[must_use]
    pub fn with_enforce_ownership(mut self, enforce: bool) -> Self {
        self.enforce_ownership = enforce;
        self
    }

    #[must_use]
    pub fn enforce_ownership(&self) -> bool {
        self.enforce_ownership
    }
}

#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    signer: TokenSigner,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, signer: TokenSigner) -> Self {
        Self { config, signer }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn signer(&self) -> &TokenSigner {
        &self.signer
    }
}
