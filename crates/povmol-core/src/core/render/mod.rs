//! Renderable projection of a molecule and its hand-off to a renderer.
//!
//! - [`primitives`] - Spheres, cylinders, text and boolean combinations with their textures
//! - [`style`] - Per-element colors and radii with fallbacks for unknown elements
//! - [`overlay`] - Camera-facing labels and bond sticks
//! - [`scene`] - A camera, lights and objects making up one frame
//! - [`backend`] - The [`backend::RenderBackend`] seam towards the external renderer
//! - [`sdl`] - POV-Ray scene description output

pub mod backend;
pub mod overlay;
pub mod primitives;
pub mod scene;
pub mod sdl;
pub mod style;
