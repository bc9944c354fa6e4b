//! Per-frame pose and scene computation.
//!
//! A [`Baseline`] holds the molecule as it looks before any motion. Every
//! frame starts from its own copy of that baseline, so the scene for a step
//! depends only on the baseline, the motion and the step number. Frames can
//! therefore be computed in any order, or in parallel.

use super::config::{Motion, SceneConfig};
use super::error::EngineError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::molecule::{Molecule, MoleculeError, Step};
use crate::core::render::scene::Scene;
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The unmoved molecule every frame is derived from.
#[derive(Debug, Clone)]
pub struct Baseline {
    molecule: Molecule,
}

impl Baseline {
    pub fn new(molecule: Molecule) -> Self {
        Self { molecule }
    }

    pub fn molecule(&self) -> &Molecule {
        &self.molecule
    }

    /// The molecule as it stands at `step`.
    ///
    /// The centroid is first placed at `translate_to` (if set), then moved by
    /// `velocity * step`, and finally the molecule is turned about its
    /// centroid by `radians_per_step * (step + 1)`.
    pub fn pose(&self, motion: &Motion, step: usize) -> Result<Molecule, MoleculeError> {
        let mut molecule = self.molecule.clone();
        if let Some(target) = motion.translate_to {
            molecule.translate_to(&target);
        }
        if let Some(velocity) = motion.velocity {
            molecule.translate_by(&(velocity * step as f64));
        }
        if let Some(rotation) = motion.rotation {
            molecule.rotate_absolute_for_step(
                &rotation.axis,
                rotation.radians_per_step,
                Step::Frame(step),
            )?;
        }
        Ok(molecule)
    }
}

/// Builds the complete scene for one frame.
pub fn scene_for_step(
    config: &SceneConfig,
    baseline: &Baseline,
    frame_id: usize,
) -> Result<Scene, EngineError> {
    let molecule = baseline
        .pose(&config.motion, frame_id)
        .map_err(|source| EngineError::Frame { frame_id, source })?;
    debug!(
        "Frame {} ({:.3}s): {} objects",
        frame_id,
        config.frames.seconds(frame_id),
        molecule.primitives().len()
    );
    Ok(Scene::new(config.camera)
        .with_lights(config.lights.iter().copied())
        .with_objects(molecule.primitives().iter().cloned()))
}

/// Number of frames computed together before they are handed to the backend.
///
/// Only one batch of scenes is held in memory at a time.
pub const FRAME_BATCH_SIZE: usize = 64;

/// Computes the scenes for one batch of `frame_ids`, returned in the order given.
///
/// Reports one [`Progress::TaskIncrement`] per frame; starting and finishing
/// the task is left to the caller, which usually spans several batches.
pub fn compute_frames(
    config: &SceneConfig,
    baseline: &Baseline,
    frame_ids: &[usize],
    reporter: &ProgressReporter,
) -> Result<Vec<(usize, Scene)>, EngineError> {
    if frame_ids.is_empty() {
        return Err(EngineError::NoFrames);
    }

    #[cfg(not(feature = "parallel"))]
    let iterator = frame_ids.iter();

    #[cfg(feature = "parallel")]
    let iterator = frame_ids.par_iter();

    iterator
        .map(|&frame_id| {
            let scene = scene_for_step(config, baseline, frame_id)?;
            reporter.report(Progress::TaskIncrement);
            Ok((frame_id, scene))
        })
        .collect()
}

/// Logs a warning when any of `frame_ids` lies past the end of the animation.
///
/// Such frames are still computed.
pub fn warn_out_of_range(config: &SceneConfig, frame_ids: &[usize]) {
    if frame_ids.iter().any(|&id| !config.frames.contains(id)) {
        warn!(
            "Frame number(s) outside of range(0, {})",
            config.frames.number_frames
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::engine::config::{SceneConfigBuilder, StepRotation};
    use nalgebra::{Point3, Vector3};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn baseline() -> Baseline {
        let atoms = vec![
            Atom::new("C1", "C", Point3::new(-1.0, 0.0, 0.0)),
            Atom::new("O1", "O", Point3::new(1.0, 0.0, 0.0)),
        ];
        Baseline::new(Molecule::from_atoms("pair", atoms, true, Vector3::zeros()).unwrap())
    }

    fn config(motion: Motion) -> SceneConfig {
        SceneConfigBuilder::new()
            .pdb_path(PathBuf::from("unused.pdb"))
            .number_frames(8)
            .translate_to(motion.translate_to)
            .velocity(motion.velocity)
            .rotation(motion.rotation)
            .build()
            .unwrap()
    }

    fn spin() -> Motion {
        Motion {
            rotation: Some(StepRotation::full_turn(Vector3::z(), 8)),
            ..Motion::default()
        }
    }

    #[test]
    fn pose_does_not_touch_the_baseline() {
        let base = baseline();
        let before = base.molecule().atoms().to_vec();
        let _ = base.pose(&spin(), 3).unwrap();
        assert_eq!(base.molecule().atoms(), &before[..]);
    }

    #[test]
    fn pose_depends_only_on_step() {
        let base = baseline();
        let motion = Motion {
            velocity: Some(Vector3::new(0.5, 0.0, 0.0)),
            ..spin()
        };
        let late = base.pose(&motion, 5).unwrap();
        let _ = base.pose(&motion, 1).unwrap();
        let again = base.pose(&motion, 5).unwrap();
        assert_eq!(late.atoms(), again.atoms());
    }

    #[test]
    fn pose_applies_translation_then_drift() {
        let base = baseline();
        let motion = Motion {
            translate_to: Some(Point3::new(0.0, 4.0, 0.0)),
            velocity: Some(Vector3::new(1.0, 0.0, 0.0)),
            rotation: None,
        };
        let posed = base.pose(&motion, 3).unwrap();
        assert!((posed.center() - Point3::new(3.0, 4.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn step_n_turns_n_plus_one_increments() {
        let base = baseline();
        let posed = base.pose(&spin(), 1).unwrap();
        // Two eighths of a turn about z: (1, 0, 0) ends up at (0, 1, 0).
        assert!((posed.atoms()[1].position - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn scene_contains_camera_lights_and_molecule() {
        let config = config(spin());
        let scene = scene_for_step(&config, &baseline(), 0).unwrap();
        assert_eq!(scene.camera, config.camera);
        assert_eq!(scene.lights, config.lights);
        assert_eq!(scene.objects.len(), 2);
    }

    #[test]
    fn frames_come_back_in_request_order() {
        let config = config(spin());
        let ids = [6, 0, 3, 12];
        let count = AtomicUsize::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if matches!(event, Progress::TaskIncrement) {
                count.fetch_add(1, Ordering::SeqCst);
            }
        }));
        let frames = compute_frames(&config, &baseline(), &ids, &reporter).unwrap();
        let returned: Vec<usize> = frames.iter().map(|(id, _)| *id).collect();
        assert_eq!(returned, ids);
        drop(reporter);
        assert_eq!(count.into_inner(), 4);

        let sequential = scene_for_step(&config, &baseline(), 3).unwrap();
        assert_eq!(frames[2].1, sequential);
    }

    #[test]
    fn empty_frame_list_is_an_error() {
        let config = config(Motion::default());
        let result = compute_frames(&config, &baseline(), &[], &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::NoFrames)));
    }
}
