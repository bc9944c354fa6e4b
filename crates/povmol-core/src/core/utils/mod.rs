//! Small numerical helpers shared by the model and render layers.

pub mod geometry;
