//! # ResolveForge Shared Library
//!
//! Types, persistence and business logic shared by the ResolveForge API
//! server and its integration tests.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and migrations
//! - `models`: Database models (users, monthly usage, claims, marketing)
//! - `auth`: Password hashing, session tokens, request auth context
//! - `quota`: Monthly usage quota tracker for metered analyses
//! - `analysis`: Complaint analysis via the language-model provider

pub mod analysis;
pub mod auth;
pub mod db;
pub mod models;
pub mod quota;

/// Current version of the ResolveForge shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
