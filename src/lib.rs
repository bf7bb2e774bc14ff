//! quotawatch binary crate — CLI entry points and the web dashboard.
//!
//! Domain logic (credential registry, usage fetching, aggregation) lives in
//! `quotawatch-core`; this crate wires it to a clap CLI and an axum server.

pub mod check;
pub mod config;
pub mod web;
