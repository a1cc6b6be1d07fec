//! gatehouse: a user-account authentication service.
//!
//! Issues, validates and invalidates RS256-signed access tokens for
//! account operations backed by Postgres. Invalidation is claim-based:
//! each account carries a version counter, every token embeds a snapshot
//! of it, and credential-affecting mutations bump the counter so older
//! tokens stop verifying against the stored record.

pub mod auth;
pub mod configuration;
pub mod domain;
pub mod error;
pub mod logger;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod startup;
pub mod store;
pub mod telemetry;
pub mod validators;
