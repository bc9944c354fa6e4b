use crate::core::models::molecule::{Molecule, MoleculeError};
use crate::core::render::backend::RenderBackend;
use crate::core::render::primitives::Camera;
use crate::engine::config::{RenderOptions, SceneConfig};
use crate::engine::error::EngineError;
use crate::engine::frame::{self, Baseline, FRAME_BATCH_SIZE};
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::BTreeSet;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSummary {
    /// Number of frames handed to the backend.
    pub frame_count: usize,
    pub atom_count: usize,
    /// Element symbols that were drawn with the fallback style.
    pub unstyled_elements: BTreeSet<String>,
}

/// Loads the configured molecule, computes the requested frames and hands
/// each scene to `backend`.
///
/// Without `frame_ids` every frame of the animation is rendered. Requested ids
/// are deduplicated and submitted in ascending order. Frames are computed in
/// batches of [`FRAME_BATCH_SIZE`] and each batch is submitted before the next
/// one is computed.
#[instrument(skip_all, name = "animate_workflow")]
pub fn run<B: RenderBackend>(
    config: &SceneConfig,
    frame_ids: Option<&[usize]>,
    backend: &mut B,
    reporter: &ProgressReporter,
) -> Result<AnimationSummary, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    let molecule = prepare_molecule(config)?;
    let atom_count = molecule.len();
    let unstyled_elements = molecule.warnings().clone();
    let baseline = Baseline::new(molecule);

    let (total, mut ids): (usize, Box<dyn Iterator<Item = usize>>) = match frame_ids {
        Some(ids) => {
            let mut listed = ids.to_vec();
            listed.sort_unstable();
            listed.dedup();
            frame::warn_out_of_range(config, &listed);
            (listed.len(), Box::new(listed.into_iter()))
        }
        None => (config.frames.number_frames, Box::new(config.frames.ids())),
    };
    if total == 0 {
        return Err(EngineError::NoFrames);
    }
    info!(
        "Prepared {} atoms; rendering {} of {} frames",
        atom_count, total, config.frames.number_frames
    );
    reporter.report(Progress::PhaseFinish);

    reporter.report(Progress::PhaseStart { name: "Rendering" });
    reporter.report(Progress::TaskStart {
        total_steps: total as u64,
    });
    let mut batch = Vec::with_capacity(FRAME_BATCH_SIZE.min(total));
    let mut frame_count = 0;
    while next_batch(&mut ids, &mut batch) {
        let scenes = frame::compute_frames(config, &baseline, &batch, reporter)?;
        for (frame_id, scene) in &scenes {
            backend
                .render(*frame_id, scene)
                .map_err(|e| EngineError::Backend {
                    frame_id: *frame_id,
                    source: Box::new(e),
                })?;
        }
        frame_count += scenes.len();
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    info!("Submitted {} frames to the render backend", frame_count);
    Ok(AnimationSummary {
        frame_count,
        atom_count,
        unstyled_elements,
    })
}

/// Refills `batch` with up to [`FRAME_BATCH_SIZE`] ids; `false` once `ids` is exhausted.
fn next_batch(ids: &mut impl Iterator<Item = usize>, batch: &mut Vec<usize>) -> bool {
    batch.clear();
    batch.extend(ids.by_ref().take(FRAME_BATCH_SIZE));
    !batch.is_empty()
}

/// Reads the molecule from the configured PDB file and applies the render
/// options, giving the baseline every frame starts from.
pub fn prepare_molecule(config: &SceneConfig) -> Result<Molecule, EngineError> {
    let source = &config.molecule;
    let mut molecule = Molecule::from_pdb(&source.pdb_path, source.center, source.offset)?;
    apply_render_options(&mut molecule, &config.render, &config.camera)?;
    Ok(molecule)
}

/// Applies style, stick model and labels, in that order.
pub fn apply_render_options(
    molecule: &mut Molecule,
    options: &RenderOptions,
    camera: &Camera,
) -> Result<(), MoleculeError> {
    if let Some(texture) = &options.style_override {
        molecule.set_style(Some(texture.clone()));
    }
    if let Some(scale) = options.stick_scale {
        molecule.stick_overlay(scale)?;
    }
    if options.show_names {
        molecule.label_overlay(camera, true);
    }
    if options.show_indices {
        molecule.label_overlay(camera, false);
    }
    Ok(())
}
