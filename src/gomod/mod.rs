mod manifest;
mod parser;

pub use manifest::{Manifest, RequireStmt, Requirement};

/// Conventional manifest name looked up inside directory targets.
pub const MANIFEST_FILE: &str = "go.mod";
