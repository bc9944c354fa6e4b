//! # Workflows Module
//!
//! Top-level entry points that tie the engine and the core together.
//!
//! - **Animation Workflow** ([`animate`]) - Loads the configured molecule, applies the
//!   render options, computes every requested frame and submits the scenes to a
//!   render backend.

pub mod animate;
