//! Reading molecular structure files.
//!
//! The [`traits::MolecularFile`] trait is the seam between file formats and the
//! molecule model; [`pdb`] implements it for the fixed-column PDB format.

pub mod pdb;
pub mod traits;
