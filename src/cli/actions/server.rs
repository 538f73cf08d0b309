use crate::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthState},
    },
    credentials::TokenSigner,
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: Option<SecretString>,
    pub token_ttl_seconds: i64,
    pub enforce_ownership: bool,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the database is unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!(
        port = args.port,
        token_ttl_seconds = args.token_ttl_seconds,
        "Server args"
    );
    info!("Database: {}", redact_dsn(&args.dsn));

    let signer = if let Some(secret) = &args.token_secret {
        TokenSigner::from_secret(secret)
    } else {
        warn!("No token secret configured, using an ephemeral key; tokens will not survive a restart");
        TokenSigner::ephemeral()
    }
    .with_ttl_seconds(args.token_ttl_seconds);

    if args.enforce_ownership {
        info!("Ownership enforcement enabled");
    } else {
        warn!("Ownership enforcement disabled: BOLA flaws are active");
    }

    let auth_state = Arc::new(AuthState::new(
        AuthConfig::new().with_enforce_ownership(args.enforce_ownership),
        signer,
    ));

    api::new(args.port, &args.dsn, auth_state).await
}

/// Strip the password from a DSN before it is logged.
fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("***"));
            }
            url.to_string()
        }
        Err(_) => "<unparsable dsn>".to_string(),
    }
}
