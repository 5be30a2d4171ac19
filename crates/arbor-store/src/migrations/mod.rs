//! Schema migrations
//!
//! SQL files under `migrations/` are compiled into the binary and applied in
//! order by [`apply_migrations`]. Each applied file is recorded in
//! `schema_version` with its SHA-256, and a later edit to an applied file is
//! refused.

mod embedded;
mod runner;

pub use runner::apply_migrations;
