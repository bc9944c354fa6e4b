//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! - **Molecular Representation** ([`models`]) - Atoms and molecules with their transforms
//! - **File I/O** ([`io`]) - Reading PDB coordinate and connectivity records
//! - **Rendering** ([`render`]) - Primitives, element styles, overlays, scenes and SDL output
//! - **Utilities** ([`utils`]) - Centroids, rotations and other geometry helpers

pub mod io;
pub mod models;
pub mod render;
pub mod utils;
