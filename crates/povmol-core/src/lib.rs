//! # povmol
//!
//! Molecule modeling for scripted POV-Ray animations: read a PDB structure,
//! move, rotate, scale and split it, decorate it with labels or a
//! ball-and-stick model, and emit one scene per animation frame.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Atom and molecule models, the PDB reader,
//!   render primitives and geometry helpers. Nothing here knows about frames.
//!
//! - **[`engine`]: The Frame Logic.** Validated scene configuration and the
//!   pure per-frame pose computation, parallelized over frames when the
//!   `parallel` feature is enabled.
//!
//! - **[`workflows`]: The Public API.** Ties configuration, molecule loading
//!   and a [`core::render::backend::RenderBackend`] together into a complete
//!   animation run.

pub mod core;
pub mod engine;
pub mod workflows;
