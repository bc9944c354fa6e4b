use nalgebra::{Point3, Vector3};

/// A single atom read from a coordinate record.
///
/// `bonds` holds 0-based indices into the atom list of the molecule that
/// owned this atom when the file was parsed. Those indices are only
/// meaningful against that list; see [`Molecule::divide`] for what happens
/// when atoms leave it.
///
/// [`Molecule::divide`]: super::molecule::Molecule::divide
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name (e.g. "CA", "O1").
    pub name: String,
    /// The chemical element symbol (e.g. "C", "Cr").
    pub element: String,
    /// The 3D coordinates of the atom.
    pub position: Point3<f64>,
    /// Indices of bonded atoms, in file order.
    pub bonds: Vec<usize>,
}

impl Atom {
    /// Creates an atom without any bonds.
    pub fn new(name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element: element.to_string(),
            position,
            bonds: Vec::new(),
        }
    }

    /// Adds a bond to `index` unless it is already present.
    pub fn add_bond(&mut self, index: usize) {
        if !self.bonds.contains(&index) {
            self.bonds.push(index);
        }
    }

    pub fn is_bonded_to(&self, index: usize) -> bool {
        self.bonds.contains(&index)
    }

    pub(crate) fn translate(&mut self, delta: &Vector3<f64>) {
        self.position += delta;
    }
}
