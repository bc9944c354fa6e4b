//! POV-Ray scene description language (SDL) output.
//!
//! Every render type implements [`Display`] as its SDL text, and
//! [`SdlBackend`] writes one `.pov` file per frame. Turning those files into
//! images is left to POV-Ray itself.

use super::backend::RenderBackend;
use super::primitives::{Camera, Finish, LightSource, Pigment, Primitive, Texture};
use super::scene::Scene;
use nalgebra::{Point3, Vector3};
use std::fmt::{self, Display, Formatter};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Minimum width of the zero-padded frame number in output file names.
const FRAME_NUMBER_WIDTH: usize = 3;

struct Vec3<'a>(&'a [f64]);

impl Display for Vec3<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}, {}, {}>", self.0[0], self.0[1], self.0[2])
    }
}

fn point(p: &Point3<f64>) -> Vec3<'_> {
    Vec3(p.coords.as_slice())
}

fn vector(v: &Vector3<f64>) -> Vec3<'_> {
    Vec3(v.as_slice())
}

impl Display for Pigment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Pigment::Rgb(c) => write!(f, "pigment {{ color rgb {} }}", Vec3(c)),
            Pigment::Named(name) => write!(f, "pigment {{ color {} }}", name),
        }
    }
}

impl Display for Finish {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "finish {{ phong {} reflection {} }}",
            self.phong, self.reflection
        )
    }
}

impl Display for Texture {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "texture {{ {} {} }}", self.pigment, self.finish)
    }
}

impl Display for Camera {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "camera {{ location {} look_at {} }}",
            point(&self.location),
            point(&self.look_at)
        )
    }
}

impl Display for LightSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let i = self.intensity;
        write!(
            f,
            "light_source {{ {} color rgb {} }}",
            point(&self.position),
            Vec3(&[i, i, i])
        )
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Sphere {
                center,
                radius,
                texture,
            } => write!(f, "sphere {{ {}, {} {} }}", point(center), radius, texture),
            Primitive::Cylinder {
                base,
                cap,
                radius,
                texture,
            } => write!(
                f,
                "cylinder {{ {}, {}, {} {} }}",
                point(base),
                point(cap),
                radius,
                texture
            ),
            Primitive::Text {
                font,
                text,
                thickness,
                transform,
                texture,
            } => {
                let s = transform.scale;
                write!(
                    f,
                    "text {{ ttf \"{}\" \"{}\" {}, 0 scale {} {} rotate {} translate {} }}",
                    font,
                    text.replace('"', "\\\""),
                    thickness,
                    Vec3(&[s, s, s]),
                    texture,
                    vector(&transform.rotate),
                    vector(&transform.translate)
                )
            }
            Primitive::Intersection { members, translate } => {
                write!(f, "intersection {{")?;
                for m in members {
                    write!(f, " {}", m)?;
                }
                if let Some(t) = translate {
                    write!(f, " translate {}", vector(t))?;
                }
                write!(f, " }}")
            }
            Primitive::Union { members } => {
                write!(f, "union {{")?;
                for m in members {
                    write!(f, " {}", m)?;
                }
                write!(f, " }}")
            }
        }
    }
}

impl Display for Scene {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for include in &self.included {
            writeln!(f, "#include \"{}\"", include)?;
        }
        writeln!(f, "{}", self.camera)?;
        for light in &self.lights {
            writeln!(f, "{}", light)?;
        }
        for object in &self.objects {
            writeln!(f, "{}", object)?;
        }
        Ok(())
    }
}

/// File name used for a frame: `<prefix>_<frame>.pov`, the frame number
/// zero-padded to at least three digits so files sort in frame order.
pub fn frame_file_name(prefix: &str, frame_id: usize) -> String {
    format!("{}_{:0width$}.pov", prefix, frame_id, width = FRAME_NUMBER_WIDTH)
}

/// Writes each frame's scene as a POV-Ray `.pov` file into a directory.
#[derive(Debug, Clone)]
pub struct SdlBackend {
    output_dir: PathBuf,
    prefix: String,
    written: usize,
    last_written: Option<PathBuf>,
}

impl SdlBackend {
    /// Creates the backend, creating `output_dir` if it does not exist yet.
    pub fn new(output_dir: impl Into<PathBuf>, prefix: &str) -> io::Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            prefix: prefix.to_string(),
            written: 0,
            last_written: None,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Number of scene files written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn last_written(&self) -> Option<&Path> {
        self.last_written.as_deref()
    }
}

impl RenderBackend for SdlBackend {
    type Error = io::Error;

    fn render(&mut self, frame_id: usize, scene: &Scene) -> Result<(), Self::Error> {
        let path = self
            .output_dir
            .join(frame_file_name(&self.prefix, frame_id));
        debug!("Writing scene for frame {} to {:?}", frame_id, path);
        let mut writer = BufWriter::new(File::create(&path)?);
        write!(writer, "{}", scene)?;
        writer.flush()?;
        self.written += 1;
        self.last_written = Some(path);
        Ok(())
    }
}
