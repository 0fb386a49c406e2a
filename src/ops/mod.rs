//! High-level operations.
//!
//! This module contains the implementation of pbxgen commands.

pub mod add_files;
pub mod check;
pub mod generate;

pub use add_files::{add_files, AddOptions, AddResult};
pub use check::{check, check_text, CheckReport};
pub use generate::{find_manifest, generate, manifest_path, GenerateOptions, GenerateResult};
