//! Static lookup tables shared read-only by every document.

pub mod tags;
pub mod unicode;

pub use unicode::{char_to_tex, string_to_tex, UNICODE_TO_TEX};
