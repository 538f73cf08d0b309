use anyhow::Result;
use clap::{builder::BoolishValueParser, Arg, ArgAction, Command};
use secrecy::SecretString;

use crate::credentials::DEFAULT_TOKEN_TTL_SECONDS;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL: &str = "token-ttl";
pub const ARG_ENFORCE_OWNERSHIP: &str = "enforce-ownership";

#[derive(Debug)]
pub struct Options {
    pub token_secret: Option<SecretString>,
    pub token_ttl_seconds: i64,
    pub enforce_ownership: bool,
}

impl Options {
    /// # Errors
    /// Returns an error if the token TTL is not positive.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let token_ttl_seconds = matches
            .get_one::<i64>(ARG_TOKEN_TTL)
            .copied()
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);
        if token_ttl_seconds <= 0 {
            anyhow::bail!("--{ARG_TOKEN_TTL} must be greater than zero");
        }

        Ok(Self {
            token_secret: matches
                .get_one::<String>(ARG_TOKEN_SECRET)
                .map(|secret| SecretString::from(secret.clone())),
            token_ttl_seconds,
            enforce_ownership: matches.get_flag(ARG_ENFORCE_OWNERSHIP),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Secret used to sign access tokens")
                .long_help(
                    "Secret used to sign access tokens (HS256). When omitted a random key is generated at startup and tokens do not survive a restart.",
                )
                .env("BOLALAB_TOKEN_SECRET")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL)
                .long(ARG_TOKEN_TTL)
                .help("Access token lifetime in seconds")
                .default_value("1800")
                .env("BOLALAB_TOKEN_TTL")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_ENFORCE_OWNERSHIP)
                .long(ARG_ENFORCE_OWNERSHIP)
                .help("Reject cross-user profile reads and post updates/deletes (403)")
                .env("BOLALAB_ENFORCE_OWNERSHIP")
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
        )
}
