//! # Bolalab
//!
//! `bolalab` is a small registration/login/posts API that intentionally ships
//! Broken Object-Level Authorization (BOLA) flaws for security training.
//!
//! ## Authentication
//!
//! Passwords are stored as Argon2id hashes. `POST /login` issues an HS256
//! bearer token whose subject is the username; protected routes resolve the
//! caller from that token.
//!
//! ## The flaws
//!
//! - `GET /users/{id}` returns any user's profile to any authenticated caller.
//! - `PUT /posts/{id}` and `DELETE /posts/{id}` never compare the post owner
//!   with the caller.
//!
//! Starting the server with `--enforce-ownership` applies the corrected
//! contract instead: those requests fail with `403 Forbidden`.

pub mod api;
pub mod cli;
pub mod credentials;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
