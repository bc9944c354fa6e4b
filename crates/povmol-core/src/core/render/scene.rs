use super::primitives::{Camera, LightSource, Primitive};

/// Include file that defines the named colors used by label textures.
pub const COLORS_INCLUDE: &str = "colors.inc";

/// Everything the render backend needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub camera: Camera,
    pub lights: Vec<LightSource>,
    pub objects: Vec<Primitive>,
    pub included: Vec<String>,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            lights: Vec::new(),
            objects: Vec::new(),
            included: vec![COLORS_INCLUDE.to_string()],
        }
    }

    pub fn with_lights(mut self, lights: impl IntoIterator<Item = LightSource>) -> Self {
        self.lights.extend(lights);
        self
    }

    pub fn with_objects(mut self, objects: impl IntoIterator<Item = Primitive>) -> Self {
        self.objects.extend(objects);
        self
    }
}
