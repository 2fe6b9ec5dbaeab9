//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types, result types and warning records
//! - The built-in identifier extractor

pub mod error;
pub mod identifiers;

use std::any::Any;

// Re-export commonly used items
pub use error::{MlpError, MlpResult, ProcessingWarning, RegistryError, WarningKind};
pub use identifiers::SimpleIdentifierExtractor;

/// Best-effort text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown error".to_string()
    }
}
