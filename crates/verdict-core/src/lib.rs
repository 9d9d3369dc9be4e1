//! Verdict Core
//!
//! Core types, traits, and utilities shared across Verdict components.
//!
//! This crate provides:
//! - Error types and result handling
//! - Text cleaning used identically at training and serving time
//! - Customer and spam record types
//! - CSV dataset readers with an explicit column contract

pub mod dataset;
pub mod error;
pub mod text;
pub mod types;

pub use dataset::{ChurnRow, SpamColumns, SpamRow};
pub use error::{Error, Result};
pub use text::clean_text;
pub use types::{CustomerRecord, SpamLabel, NEGATIVE_CLASS, POSITIVE_CLASS};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::text::clean_text;
    pub use crate::types::{CustomerRecord, SpamLabel};
}
