//! # bd-core
//!
//! Core types, traits, and utilities for Builders RS.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types
//! - Result type aliases
//! - Core traits (Entity, Identifiable, UserContext)
//! - Configuration types
//! - Business-calendar clock

pub mod clock;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use clock::*;
pub use error::*;
pub use result::*;
pub use traits::*;
