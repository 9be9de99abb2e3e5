//! # bd-contracts
//!
//! Contract validation for Builders RS.
//!
//! Contracts validate input and entities before services act on them.
//! They collect every problem into `ValidationErrors` instead of stopping
//! at the first one.

pub mod base;
pub mod catalog;
pub mod requests;

pub use base::*;
