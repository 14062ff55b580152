//! Shared types, errors, and configuration for Ledgerline.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Fixed-point amount helpers
//! - Pagination types for list queries
//! - Caller-facing error type
//! - Configuration management and tracing setup

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::{AppConfig, TenantSettings};
pub use error::{AppError, AppResult};
