//! Cranium atlas image pipeline
//!
//! Batch stages over a PDF anatomy atlas:
//! - [`extract::Extractor`]: write embedded images to `<output>/raw`
//! - [`classify::ImageClassifier`]: sort raw images into category directories,
//!   by size ([`classify::SizeHeuristic`]) or by curated table
//!   ([`classify::StaticMapping`])
//! - [`audit::Auditor`]: report which bones mentioned in the text have images

pub mod audit;
pub mod catalog;
pub mod classify;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod extract;
pub mod pdf;

pub use catalog::{Bone, Category};
pub use error::{Error, Result};
