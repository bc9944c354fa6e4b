use crate::core::render::primitives::{Camera, LightSource, Texture};
use crate::core::utils::geometry;
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Where the molecule comes from and how it is placed before any motion.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeSource {
    pub pdb_path: PathBuf,
    /// Move the centroid to the origin after applying `offset`.
    pub center: bool,
    pub offset: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderOptions {
    pub show_names: bool,
    pub show_indices: bool,
    /// Enables the ball-and-stick model with this scale factor.
    pub stick_scale: Option<f64>,
    pub style_override: Option<Texture>,
}

/// A constant-speed rotation about the molecule's centroid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRotation {
    pub axis: Vector3<f64>,
    pub radians_per_step: f64,
}

impl StepRotation {
    /// One full turn spread evenly over `number_frames` frames.
    pub fn full_turn(axis: Vector3<f64>, number_frames: usize) -> Self {
        Self {
            axis,
            radians_per_step: TAU / number_frames.max(1) as f64,
        }
    }
}

/// How the molecule moves from frame to frame, relative to its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    /// Fixed position for the centroid in every frame.
    pub translate_to: Option<Point3<f64>>,
    /// Displacement added per step, on top of `translate_to` when both are set.
    pub velocity: Option<Vector3<f64>>,
    pub rotation: Option<StepRotation>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRange {
    pub number_frames: usize,
    /// Seconds per frame; used to turn elapsed time into frame numbers.
    pub frame_time: f64,
}

impl FrameRange {
    /// All frames of the animation, `0..number_frames`.
    pub fn ids(&self) -> Range<usize> {
        0..self.number_frames
    }

    /// Whether `frame_id` lies inside the animation. The last valid id is
    /// `number_frames` itself, so a closing frame can show the end pose.
    pub fn contains(&self, frame_id: usize) -> bool {
        frame_id <= self.number_frames
    }

    pub fn seconds(&self, frame_id: usize) -> f64 {
        frame_id as f64 * self.frame_time
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub molecule: MoleculeSource,
    pub render: RenderOptions,
    pub camera: Camera,
    pub lights: Vec<LightSource>,
    pub motion: Motion,
    pub frames: FrameRange,
}

#[derive(Default)]
pub struct SceneConfigBuilder {
    pdb_path: Option<PathBuf>,
    center: Option<bool>,
    offset: Option<Vector3<f64>>,
    render: RenderOptions,
    camera: Option<Camera>,
    lights: Option<Vec<LightSource>>,
    motion: Motion,
    number_frames: Option<usize>,
    frame_time: Option<f64>,
}

impl SceneConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pdb_path(mut self, path: PathBuf) -> Self {
        self.pdb_path = Some(path);
        self
    }
    pub fn center(mut self, center: bool) -> Self {
        self.center = Some(center);
        self
    }
    pub fn offset(mut self, offset: Vector3<f64>) -> Self {
        self.offset = Some(offset);
        self
    }
    pub fn show_names(mut self, show: bool) -> Self {
        self.render.show_names = show;
        self
    }
    pub fn show_indices(mut self, show: bool) -> Self {
        self.render.show_indices = show;
        self
    }
    pub fn stick_scale(mut self, scale: Option<f64>) -> Self {
        self.render.stick_scale = scale;
        self
    }
    pub fn style_override(mut self, texture: Option<Texture>) -> Self {
        self.render.style_override = texture;
        self
    }
    pub fn camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }
    pub fn lights(mut self, lights: Vec<LightSource>) -> Self {
        self.lights = Some(lights);
        self
    }
    pub fn translate_to(mut self, target: Option<Point3<f64>>) -> Self {
        self.motion.translate_to = target;
        self
    }
    pub fn velocity(mut self, velocity: Option<Vector3<f64>>) -> Self {
        self.motion.velocity = velocity;
        self
    }
    pub fn rotation(mut self, rotation: Option<StepRotation>) -> Self {
        self.motion.rotation = rotation;
        self
    }
    pub fn number_frames(mut self, n: usize) -> Self {
        self.number_frames = Some(n);
        self
    }
    pub fn frame_time(mut self, seconds: f64) -> Self {
        self.frame_time = Some(seconds);
        self
    }

    /// Builds the configuration.
    ///
    /// `center` defaults to `true`, `offset` to zero, the camera and lights
    /// to the stock scene. The PDB path and the frame count are required.
    pub fn build(self) -> Result<SceneConfig, ConfigError> {
        let pdb_path = self
            .pdb_path
            .ok_or(ConfigError::MissingParameter("pdb_path"))?;
        let number_frames = self
            .number_frames
            .ok_or(ConfigError::MissingParameter("number_frames"))?;
        if number_frames == 0 {
            return Err(invalid("number_frames", "must be at least 1"));
        }
        let frame_time = self.frame_time.unwrap_or(1.0 / number_frames as f64);
        if !(frame_time.is_finite() && frame_time > 0.0) {
            return Err(invalid("frame_time", format!("must be positive (got {frame_time})")));
        }
        if let Some(scale) = self.render.stick_scale {
            if !scale.is_finite() || scale == 0.0 {
                return Err(invalid("stick_scale", format!("must be finite and non-zero (got {scale})")));
            }
        }
        if let Some(rotation) = &self.motion.rotation {
            if !rotation.radians_per_step.is_finite() {
                return Err(invalid("rotation.radians_per_step", "must be finite"));
            }
            if geometry::rotation_about_axis(&rotation.axis, rotation.radians_per_step).is_none() {
                return Err(invalid(
                    "rotation.axis",
                    format!(
                        "must be finite and longer than {:e}",
                        geometry::AXIS_EPSILON
                    ),
                ));
            }
        }

        Ok(SceneConfig {
            molecule: MoleculeSource {
                pdb_path,
                center: self.center.unwrap_or(true),
                offset: self.offset.unwrap_or_else(Vector3::zeros),
            },
            render: self.render,
            camera: self.camera.unwrap_or_default(),
            lights: self
                .lights
                .unwrap_or_else(|| vec![LightSource::default()]),
            motion: self.motion,
            frames: FrameRange {
                number_frames,
                frame_time,
            },
        })
    }
}

fn invalid(parameter: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        parameter,
        reason: reason.into(),
    }
}
