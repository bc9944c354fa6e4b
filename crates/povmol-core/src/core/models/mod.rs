//! # Core Models Module
//!
//! Data structures describing a molecule as it moves through a scene.
//!
//! - [`atom`] - A single atom with its name, element, position and bond list
//! - [`molecule`] - An owned set of atoms with a cached centroid, rigid-body
//!   transforms, splitting, and the renderable projection rebuilt after each change
//!
//! ```ignore
//! use povmol::core::models::molecule::Molecule;
//! use nalgebra::Vector3;
//!
//! let mut mol = Molecule::from_pdb("pdb/ethanol.pdb", true, Vector3::zeros())?;
//! mol.rotate(&Vector3::y(), std::f64::consts::FRAC_PI_4)?;
//! println!("{mol}");
//! ```

pub mod atom;
pub mod molecule;
