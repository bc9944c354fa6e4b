use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// An RGB color with components in `[0, 1]` (values above 1 brighten in POV-Ray).
pub type Color = [f64; 3];

/// Surface color of a texture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pigment {
    /// Explicit RGB color.
    Rgb(Color),
    /// A color identifier from an included POV-Ray file (e.g. `"Gold"` from `colors.inc`).
    Named(String),
}

/// Surface lighting parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Finish {
    pub phong: f64,
    pub reflection: f64,
}

/// Material descriptor attached to every drawable primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub pigment: Pigment,
    pub finish: Finish,
}

impl Texture {
    pub fn rgb(color: Color, phong: f64, reflection: f64) -> Self {
        Self {
            pigment: Pigment::Rgb(color),
            finish: Finish { phong, reflection },
        }
    }

    pub fn named(color: &str, phong: f64, reflection: f64) -> Self {
        Self {
            pigment: Pigment::Named(color.to_string()),
            finish: Finish { phong, reflection },
        }
    }
}

/// A perspective camera looking from `location` at `look_at`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Camera {
    pub location: Point3<f64>,
    pub look_at: Point3<f64>,
}

impl Camera {
    pub fn new(location: Point3<f64>, look_at: Point3<f64>) -> Self {
        Self { location, look_at }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Point3::new(0.0, 8.0, -26.0), Point3::new(0.0, 2.0, -5.0))
    }
}

/// A point light with a grey-level intensity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightSource {
    pub position: Point3<f64>,
    pub intensity: f64,
}

impl LightSource {
    pub fn new(position: Point3<f64>, intensity: f64) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

impl Default for LightSource {
    fn default() -> Self {
        Self::new(Point3::new(2.0, 8.0, -20.0), 0.8)
    }
}

/// Text placement for a [`Primitive::Text`] object.
#[derive(Debug, Clone, PartialEq)]
pub struct TextTransform {
    /// Uniform scale applied to the glyphs.
    pub scale: f64,
    /// Rotation in degrees about x, y and z (applied in that order).
    pub rotate: Vector3<f64>,
    pub translate: Vector3<f64>,
}

/// A geometric object handed to the render backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Sphere {
        center: Point3<f64>,
        radius: f64,
        texture: Texture,
    },
    Cylinder {
        base: Point3<f64>,
        cap: Point3<f64>,
        radius: f64,
        texture: Texture,
    },
    Text {
        font: String,
        text: String,
        thickness: f64,
        transform: TextTransform,
        texture: Texture,
    },
    Intersection {
        members: Vec<Primitive>,
        translate: Option<Vector3<f64>>,
    },
    Union {
        members: Vec<Primitive>,
    },
}

impl Primitive {
    pub fn sphere(center: Point3<f64>, radius: f64, texture: Texture) -> Self {
        Self::Sphere {
            center,
            radius,
            texture,
        }
    }

    pub fn cylinder(base: Point3<f64>, cap: Point3<f64>, radius: f64, texture: Texture) -> Self {
        Self::Cylinder {
            base,
            cap,
            radius,
            texture,
        }
    }

    /// Short name of the primitive kind, as used in the scene description.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Cylinder { .. } => "cylinder",
            Self::Text { .. } => "text",
            Self::Intersection { .. } => "intersection",
            Self::Union { .. } => "union",
        }
    }
}
