use crate::cli::RenderArgs;
use crate::config::PartialSceneConfig;
use crate::error::{CliError, Result};
use crate::utils::parser;
use crate::utils::progress::CliProgressHandler;
use povmol::{
    core::render::sdl::SdlBackend, engine::progress::ProgressReporter, workflows,
};
use tracing::{info, warn};

pub fn run(args: RenderArgs, quiet: bool) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialSceneConfig::from_file(path)?,
        None => PartialSceneConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&args)?;

    let frame_ids = args
        .frames
        .as_deref()
        .map(parser::parse_frame_selection)
        .transpose()
        .map_err(|e| CliError::Argument(e.to_string()))?;

    let mut backend = SdlBackend::new(&app_config.output_dir, &app_config.prefix)?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Building scenes for {}...",
        app_config.scene.molecule.pdb_path.display()
    );
    info!("Invoking the animation workflow...");
    let summary = workflows::animate::run(
        &app_config.scene,
        frame_ids.as_deref(),
        &mut backend,
        &reporter,
    )?;

    if !summary.unstyled_elements.is_empty() {
        let symbols: Vec<&str> = summary
            .unstyled_elements
            .iter()
            .map(String::as_str)
            .collect();
        warn!("Drew elements without a style using the fallback: {:?}", symbols);
    }

    println!(
        "✓ Wrote {} scene file(s) for {} atoms to {}",
        backend.written(),
        summary.atom_count,
        backend.output_dir().display()
    );
    println!("  Render them with POV-Ray, e.g. `povray +I<file>.pov +W800 +H600`.");
    Ok(())
}
