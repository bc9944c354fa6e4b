//! # Engine Module
//!
//! Turns a validated [`config::SceneConfig`] into per-frame scenes.
//!
//! - **Configuration** ([`config`]) - Typed scene, motion and frame settings with a builder
//! - **Frame Computation** ([`frame`]) - Pure pose-for-step logic over an immutable baseline,
//!   run in parallel over frames when the `parallel` feature is enabled
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-level error type wrapping the core errors

pub mod config;
pub mod error;
pub mod frame;
pub mod progress;
