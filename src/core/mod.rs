//! Core processing modules
//!
//! This module contains the processing stages:
//! - `registry`: placeholder records for formulas, links and citations
//! - `render`: markup tree to placeholder text
//! - `reconcile`: tagged tokens to merged sentences
//! - `external`: traits for the tagger and the identifier extractor

pub mod external;
pub mod reconcile;
pub mod registry;
pub mod render;
