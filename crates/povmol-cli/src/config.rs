use crate::cli::{LabelMode, RenderArgs};
use crate::error::{CliError, Result};
use nalgebra::{Point3, Vector3};
use povmol::core::render::primitives::{Camera, LightSource, Texture};
use povmol::engine::config::{self as core_config, SceneConfig, SceneConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const DEFAULT_OUTPUT_DIR: &str = "images";
const DEFAULT_PREFIX: &str = "molecule";

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialMoleculeConfig {
    pdb_path: Option<PathBuf>,
    center: Option<bool>,
    offset: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialStyle {
    /// RGB color, or use `named` for a `colors.inc` identifier.
    color: Option<[f64; 3]>,
    named: Option<String>,
    #[serde(default)]
    phong: f64,
    #[serde(default)]
    reflection: f64,
}

impl PartialStyle {
    fn into_texture(self) -> Result<Texture> {
        match (self.color, self.named) {
            (Some(color), None) => Ok(Texture::rgb(color, self.phong, self.reflection)),
            (None, Some(name)) => Ok(Texture::named(&name, self.phong, self.reflection)),
            _ => Err(CliError::Config(
                "`render.style` requires exactly one of `color` or `named`".to_string(),
            )),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialRenderConfig {
    show_names: Option<bool>,
    show_indices: Option<bool>,
    stick_scale: Option<f64>,
    style: Option<PartialStyle>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialCameraConfig {
    location: Option<[f64; 3]>,
    look_at: Option<[f64; 3]>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialLightConfig {
    position: [f64; 3],
    intensity: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialRotationConfig {
    axis: Option<[f64; 3]>,
    radians_per_step: Option<f64>,
    /// Spread one full turn over the whole animation instead of a fixed step.
    full_turn: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialMotionConfig {
    translate_to: Option<[f64; 3]>,
    velocity: Option<[f64; 3]>,
    rotation: Option<PartialRotationConfig>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialFramesConfig {
    number_frames: Option<usize>,
    frame_time: Option<f64>,
    /// Length of the animation in seconds; with `fps` this sets the frame count.
    duration: Option<f64>,
    fps: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialOutputConfig {
    directory: Option<PathBuf>,
    prefix: Option<String>,
}

/// Scene settings as read from a TOML file, before CLI overrides and defaults.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PartialSceneConfig {
    molecule: Option<PartialMoleculeConfig>,
    render: Option<PartialRenderConfig>,
    camera: Option<PartialCameraConfig>,
    #[serde(default)]
    lights: Vec<PartialLightConfig>,
    motion: Option<PartialMotionConfig>,
    frames: Option<PartialFramesConfig>,
    output: Option<PartialOutputConfig>,
}

/// Fully resolved settings for the `render` command.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scene: SceneConfig,
    pub output_dir: PathBuf,
    pub prefix: String,
}

fn vector(v: [f64; 3]) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

fn point(v: [f64; 3]) -> Point3<f64> {
    Point3::new(v[0], v[1], v[2])
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

impl PartialSceneConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading scene configuration from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `--set` values, then the dedicated CLI flags, then defaults.
    pub fn merge_with_cli(mut self, args: &RenderArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;

        let molecule = self.molecule.take().unwrap_or_default();
        let pdb_path = args
            .input
            .clone()
            .or(molecule.pdb_path)
            .ok_or_else(|| {
                CliError::Config(
                    "No PDB file given. Use --input or set `molecule.pdb-path`.".to_string(),
                )
            })?;

        let render = self.render.take().unwrap_or_default();
        let (mut show_names, mut show_indices) = (
            render.show_names.unwrap_or(false),
            render.show_indices.unwrap_or(false),
        );
        match args.labels {
            Some(LabelMode::Names) => show_names = true,
            Some(LabelMode::Indices) => show_indices = true,
            Some(LabelMode::Both) => (show_names, show_indices) = (true, true),
            None => {}
        }
        let style_override = render.style.map(PartialStyle::into_texture).transpose()?;

        let (number_frames, frame_time) = self.merge_frames(args.number_frames)?;
        let rotation = self.merge_rotation(number_frames)?;
        let motion = self.motion.take().unwrap_or_default();

        let camera = self.merge_camera();
        let lights: Vec<LightSource> = if self.lights.is_empty() {
            vec![LightSource::default()]
        } else {
            self.lights
                .iter()
                .map(|l| {
                    LightSource::new(
                        point(l.position),
                        l.intensity.unwrap_or(LightSource::default().intensity),
                    )
                })
                .collect()
        };

        let output = self.output.take().unwrap_or_default();
        let output_dir = args
            .output
            .clone()
            .or(output.directory)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
        let prefix = args
            .prefix
            .clone()
            .or(output.prefix)
            .or_else(|| {
                pdb_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let mut builder = SceneConfigBuilder::new()
            .pdb_path(pdb_path)
            .center(molecule.center.unwrap_or(true))
            .offset(molecule.offset.map(vector).unwrap_or_else(Vector3::zeros))
            .show_names(show_names)
            .show_indices(show_indices)
            .stick_scale(args.stick.or(render.stick_scale))
            .style_override(style_override)
            .camera(camera)
            .lights(lights)
            .translate_to(motion.translate_to.map(point))
            .velocity(motion.velocity.map(vector))
            .rotation(rotation)
            .number_frames(number_frames);
        if let Some(frame_time) = frame_time {
            builder = builder.frame_time(frame_time);
        }
        let scene = builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(AppConfig {
            scene,
            output_dir,
            prefix,
        })
    }

    fn merge_frames(&mut self, cli_frames: Option<usize>) -> Result<(usize, Option<f64>)> {
        let frames = self.frames.take().unwrap_or_default();
        let from_duration = match (frames.duration, frames.fps) {
            (Some(duration), Some(fps)) => Some((duration * fps).ceil() as usize),
            (None, None) => None,
            _ => {
                return Err(CliError::Config(
                    "`frames.duration` and `frames.fps` must be given together".to_string(),
                ));
            }
        };
        let number_frames = cli_frames
            .or(frames.number_frames)
            .or(from_duration)
            .ok_or_else(|| {
                CliError::Config(
                    "Frame count unknown. Set `frames.number-frames`, `frames.duration` and `frames.fps`, or use --number-frames.".to_string(),
                )
            })?;
        let frame_time = frames.frame_time.or(frames.fps.map(|fps| 1.0 / fps));
        Ok((number_frames, frame_time))
    }

    fn merge_rotation(&mut self, number_frames: usize) -> Result<Option<core_config::StepRotation>> {
        let Some(rotation) = self.motion.as_mut().and_then(|m| m.rotation.take()) else {
            return Ok(None);
        };
        let axis = vector(rotation.axis.ok_or_else(|| {
            CliError::Config("`motion.rotation` requires `axis`".to_string())
        })?);
        match (rotation.radians_per_step, rotation.full_turn.unwrap_or(false)) {
            (Some(radians_per_step), false) => Ok(Some(core_config::StepRotation {
                axis,
                radians_per_step,
            })),
            (None, true) => Ok(Some(core_config::StepRotation::full_turn(axis, number_frames))),
            _ => Err(CliError::Config(
                "`motion.rotation` requires exactly one of `radians-per-step` or `full-turn = true`"
                    .to_string(),
            )),
        }
    }

    fn merge_camera(&mut self) -> Camera {
        let default = Camera::default();
        let camera = self.camera.take().unwrap_or_default();
        Camera::new(
            camera.location.map(point).unwrap_or(default.location),
            camera.look_at.map(point).unwrap_or(default.look_at),
        )
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "molecule.pdb-path" => {
                    self.molecule
                        .get_or_insert_with(Default::default)
                        .pdb_path = Some(PathBuf::from(value_str));
                }
                "molecule.center" => {
                    self.molecule
                        .get_or_insert_with(Default::default)
                        .center = Some(parse_value(key, value_str, "boolean")?);
                }
                "render.show-names" => {
                    self.render
                        .get_or_insert_with(Default::default)
                        .show_names = Some(parse_value(key, value_str, "boolean")?);
                }
                "render.show-indices" => {
                    self.render
                        .get_or_insert_with(Default::default)
                        .show_indices = Some(parse_value(key, value_str, "boolean")?);
                }
                "render.stick-scale" => {
                    self.render
                        .get_or_insert_with(Default::default)
                        .stick_scale = Some(parse_value(key, value_str, "float")?);
                }
                "motion.rotation.radians-per-step" => {
                    self.motion
                        .get_or_insert_with(Default::default)
                        .rotation
                        .get_or_insert_with(Default::default)
                        .radians_per_step = Some(parse_value(key, value_str, "float")?);
                }
                "frames.number-frames" => {
                    self.frames
                        .get_or_insert_with(Default::default)
                        .number_frames = Some(parse_value(key, value_str, "integer")?);
                }
                "frames.frame-time" => {
                    self.frames
                        .get_or_insert_with(Default::default)
                        .frame_time = Some(parse_value(key, value_str, "float")?);
                }
                "output.prefix" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .prefix = Some(value_str.to_string());
                }
                "output.directory" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .directory = Some(PathBuf::from(value_str));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
