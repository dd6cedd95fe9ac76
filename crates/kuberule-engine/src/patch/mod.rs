//! Patch generation (original vs working copy) and JSON Patch application.

pub mod apply;
pub mod generator;

pub use apply::{apply_patch, apply_to_target};
pub use generator::PatchGenerator;
