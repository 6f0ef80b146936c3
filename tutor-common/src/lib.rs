//! # WhatsApp Tutor Common Library
//!
//! Shared code for the tutor services including:
//! - Error type used across crates
//! - Configuration loading (CLI → ENV → TOML → default)
//! - Database initialization and row models

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
