use super::scene::Scene;

/// Receiver of finished frame scenes.
///
/// Implementors turn a [`Scene`] into whatever the renderer consumes; the
/// library never rasterizes anything itself. Frames are submitted in
/// ascending frame order even when they were computed in parallel.
pub trait RenderBackend {
    type Error: std::error::Error + Send + Sync + 'static;

    fn render(&mut self, frame_id: usize, scene: &Scene) -> Result<(), Self::Error>;
}

/// Backend that keeps every submitted scene in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingBackend {
    pub frames: Vec<(usize, Scene)>,
}

impl CollectingBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderBackend for CollectingBackend {
    type Error = std::convert::Infallible;

    fn render(&mut self, frame_id: usize, scene: &Scene) -> Result<(), Self::Error> {
        self.frames.push((frame_id, scene.clone()));
        Ok(())
    }
}
