use super::config::ConfigError;
use crate::core::io::pdb::PdbError;
use crate::core::models::molecule::MoleculeError;
use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Failed to read structure file: {source}")]
    Structure {
        #[from]
        source: PdbError,
    },

    #[error("Molecule operation failed: {source}")]
    Molecule {
        #[from]
        source: MoleculeError,
    },

    #[error("Frame {frame_id} failed: {source}")]
    Frame {
        frame_id: usize,
        #[source]
        source: MoleculeError,
    },

    #[error("Render backend failed on frame {frame_id}: {source}")]
    Backend {
        frame_id: usize,
        #[source]
        source: BoxedError,
    },

    #[error("No frames to compute")]
    NoFrames,
}
