//! Saved words, their tags, and the store that owns them
//!
//! This module provides:
//! - Word records with capture provenance and review schedule
//! - Tags with validated names and colors
//! - The word store (durable, single owner)

pub mod models;
pub mod storage;

pub use models::*;
pub use storage::{StoreError, WordStore};
