use super::atom::Atom;
use crate::core::io::pdb::{PdbError, PdbFile};
use crate::core::io::traits::MolecularFile;
use crate::core::render::overlay::{self, LabelKind};
use crate::core::render::primitives::{Camera, Primitive, Texture};
use crate::core::render::style;
use crate::core::utils::geometry;
use nalgebra::{Point3, Rotation3, Vector3};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Bond cylinders are this fraction of the stick-model scale factor wide.
const STICK_RADIUS_FRACTION: f64 = 1.0 / 3.0;
const OVERVIEW_RULE_WIDTH: usize = 54;

#[derive(Debug, Error)]
pub enum MoleculeError {
    #[error("Failed to read structure: {0}")]
    Format(#[from] PdbError),
    #[error("Molecule has no atoms")]
    Empty,
    #[error("Atom index {index} is out of range for a molecule with {len} atoms")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Atom index {0} was given more than once")]
    DuplicateIndex(usize),
    #[error("Rotation axis must have a finite, non-zero length")]
    DegenerateAxis,
    #[error("Scale factor must be finite and non-zero (got {0})")]
    InvalidScale(f64),
    #[error("Cannot convert {seconds}s into a frame with a frame time of {frame_time}s")]
    InvalidStep { seconds: f64, frame_time: f64 },
}

/// Position of a frame in an animation, either as an index or as elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Frame(usize),
    /// Elapsed time; converted to `floor(seconds / frame_time)`.
    Time { seconds: f64, frame_time: f64 },
}

impl Step {
    pub fn index(self) -> Result<usize, MoleculeError> {
        match self {
            Step::Frame(n) => Ok(n),
            Step::Time {
                seconds,
                frame_time,
            } => {
                let frames = seconds / frame_time;
                if frame_time > 0.0 && frames.is_finite() && frames >= 0.0 {
                    Ok(frames.floor() as usize)
                } else {
                    Err(MoleculeError::InvalidStep {
                        seconds,
                        frame_time,
                    })
                }
            }
        }
    }
}

impl From<usize> for Step {
    fn from(n: usize) -> Self {
        Step::Frame(n)
    }
}

/// Overlays drawn on top of the atom spheres whenever the molecule re-renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlays {
    pub element_labels: bool,
    pub index_labels: bool,
    /// Camera the labels face; set by the first label request.
    pub camera: Option<Camera>,
    /// Radius of bond cylinders once the stick model is enabled.
    pub stick_radius: Option<f64>,
}

/// A molecule that owns its atoms and keeps a renderable projection of them.
///
/// Every mutating operation recomputes the centroid and rebuilds
/// [`primitives`](Self::primitives), so both always describe the current
/// atom positions. A molecule is never empty.
#[derive(Debug, Clone)]
pub struct Molecule {
    label: String,
    atoms: Vec<Atom>,
    center: Point3<f64>,
    primitives: Vec<Primitive>,
    warnings: BTreeSet<String>,
    overlays: Overlays,
    style: Option<Texture>,
}

impl Molecule {
    /// Reads a PDB file and builds a molecule from it.
    ///
    /// See [`from_atoms`](Self::from_atoms) for the meaning of `center` and `offset`.
    pub fn from_pdb<P: AsRef<Path>>(
        path: P,
        center: bool,
        offset: Vector3<f64>,
    ) -> Result<Self, MoleculeError> {
        let path = path.as_ref();
        let (atoms, _) = PdbFile::read_from_path(path)?;
        Self::from_atoms(path.display().to_string(), atoms, center, offset)
    }

    /// Builds a molecule from PDB text.
    pub fn from_pdb_reader(
        label: &str,
        reader: &mut impl BufRead,
        center: bool,
        offset: Vector3<f64>,
    ) -> Result<Self, MoleculeError> {
        let (atoms, _) = PdbFile::read_from(reader)?;
        Self::from_atoms(label, atoms, center, offset)
    }

    /// Builds a molecule from an explicit atom list.
    ///
    /// A non-zero `offset` is added to every atom first. With `center` set, the
    /// molecule is then moved so its centroid lies at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`MoleculeError::Empty`] when `atoms` is empty.
    pub fn from_atoms(
        label: impl Into<String>,
        mut atoms: Vec<Atom>,
        center: bool,
        offset: Vector3<f64>,
    ) -> Result<Self, MoleculeError> {
        let label = label.into();
        if offset != Vector3::zeros() {
            atoms.iter_mut().for_each(|a| a.translate(&offset));
        }
        let mut centroid =
            geometry::centroid(atoms.iter().map(|a| &a.position)).ok_or(MoleculeError::Empty)?;
        if center {
            let shift = -centroid.coords;
            atoms.iter_mut().for_each(|a| a.translate(&shift));
            centroid =
                geometry::centroid(atoms.iter().map(|a| &a.position)).ok_or(MoleculeError::Empty)?;
        }

        let mut molecule = Self {
            label,
            atoms,
            center: centroid,
            primitives: Vec::new(),
            warnings: BTreeSet::new(),
            overlays: Overlays::default(),
            style: None,
        };
        info!(
            "Created a molecule from '{}' placed at [{:.2}, {:.2}, {:.2}] (centered: {})",
            molecule.label, centroid.x, centroid.y, centroid.z, center
        );
        molecule.render();
        Ok(molecule)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Unweighted centroid of the current atom positions.
    pub fn center(&self) -> Point3<f64> {
        self.center
    }

    /// Drawable objects for the current atom positions and overlays.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Element symbols without a style entry seen during the last render.
    pub fn warnings(&self) -> &BTreeSet<String> {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> BTreeSet<String> {
        std::mem::take(&mut self.warnings)
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn style(&self) -> Option<&Texture> {
        self.style.as_ref()
    }

    /// Uses `texture` for every atom sphere instead of the per-element texture,
    /// or restores the per-element textures with `None`.
    pub fn set_style(&mut self, texture: Option<Texture>) {
        self.style = texture;
        self.render();
    }

    /// Moves every atom by `delta`.
    pub fn translate_by(&mut self, delta: &Vector3<f64>) {
        self.atoms.iter_mut().for_each(|a| a.translate(delta));
        self.refresh();
    }

    /// Moves the molecule so its centroid lands on `target`.
    pub fn translate_to(&mut self, target: &Point3<f64>) {
        let delta = target - self.center;
        self.translate_by(&delta);
    }

    /// Rotates the molecule by `theta` radians about `axis` through its centroid.
    ///
    /// # Errors
    ///
    /// Returns [`MoleculeError::DegenerateAxis`] for a zero-length or non-finite axis.
    pub fn rotate(&mut self, axis: &Vector3<f64>, theta: f64) -> Result<(), MoleculeError> {
        let rotation =
            geometry::rotation_about_axis(axis, theta).ok_or(MoleculeError::DegenerateAxis)?;
        self.apply_rotation(&rotation);
        Ok(())
    }

    /// Puts the molecule in its pose for `step` of a constant-speed rotation.
    ///
    /// The stored positions are taken as the unrotated baseline, and the
    /// result is the baseline rotated by `theta_per_step * (step + 1)` about
    /// its centroid. Calling this on a fresh copy of the same baseline gives
    /// the same pose for the same step regardless of call order; calling it
    /// twice on one instance compounds the rotations.
    pub fn rotate_absolute_for_step(
        &mut self,
        axis: &Vector3<f64>,
        theta_per_step: f64,
        step: impl Into<Step>,
    ) -> Result<(), MoleculeError> {
        let step = step.into().index()?;
        let theta = theta_per_step * (step + 1) as f64;
        debug!("Rotating '{}' to step {} ({:.4} rad)", self.label, step, theta);
        self.rotate(axis, theta)
    }

    /// Multiplies every atom position by `factor`.
    ///
    /// This scales distances from the origin, not from the centroid, so an
    /// off-origin molecule moves as well as grows.
    pub fn scale_distances(&mut self, factor: f64) -> Result<(), MoleculeError> {
        self.scale_positions(factor)?;
        self.refresh();
        Ok(())
    }

    /// Adds a camera-facing label to every atom.
    ///
    /// With `use_name` the label shows the element symbol, otherwise the atom
    /// index. The labels are kept through later transforms until
    /// [`clear_labels`](Self::clear_labels) is called.
    pub fn label_overlay(&mut self, camera: &Camera, use_name: bool) {
        if use_name {
            self.overlays.element_labels = true;
        } else {
            self.overlays.index_labels = true;
        }
        self.overlays.camera = Some(*camera);
        self.render();
    }

    pub fn clear_labels(&mut self) {
        self.overlays.element_labels = false;
        self.overlays.index_labels = false;
        self.overlays.camera = None;
        self.render();
    }

    /// Switches to a ball-and-stick model.
    ///
    /// Atom positions are first scaled by `scale` to make room between the
    /// spheres, then every bond is drawn as two half-cylinders of radius
    /// `scale / 3`, each colored like the atom at its end.
    pub fn stick_overlay(&mut self, scale: f64) -> Result<(), MoleculeError> {
        self.scale_positions(scale)?;
        self.overlays.stick_radius = Some(scale * STICK_RADIUS_FRACTION);
        self.refresh();
        Ok(())
    }

    /// Moves the atoms at `indices` into a new molecule.
    ///
    /// The new molecule keeps the given index order, is not centered and is
    /// translated by `offset`. Bond lists are copied as they are, so they keep
    /// referring to positions in the list before the split; use
    /// [`divide_remapped`](Self::divide_remapped) to rewrite them.
    ///
    /// # Errors
    ///
    /// Fails without changing `self` when an index is out of range or repeated,
    /// or when either molecule would end up without atoms.
    pub fn divide(
        &mut self,
        indices: &[usize],
        label: &str,
        offset: Vector3<f64>,
    ) -> Result<Molecule, MoleculeError> {
        self.split_off(indices, label, offset, false)
    }

    /// Like [`divide`](Self::divide), but rewrites the bond lists of both
    /// molecules to their new indices and drops bonds that cross the split.
    pub fn divide_remapped(
        &mut self,
        indices: &[usize],
        label: &str,
        offset: Vector3<f64>,
    ) -> Result<Molecule, MoleculeError> {
        self.split_off(indices, label, offset, true)
    }

    fn split_off(
        &mut self,
        indices: &[usize],
        label: &str,
        offset: Vector3<f64>,
        remap: bool,
    ) -> Result<Molecule, MoleculeError> {
        let len = self.atoms.len();
        let mut seen = HashSet::with_capacity(indices.len());
        for &index in indices {
            if index >= len {
                return Err(MoleculeError::IndexOutOfRange { index, len });
            }
            if !seen.insert(index) {
                return Err(MoleculeError::DuplicateIndex(index));
            }
        }
        if indices.is_empty() || indices.len() == len {
            return Err(MoleculeError::Empty);
        }

        // Highest index first so the remaining indices stay valid.
        let mut descending = indices.to_vec();
        descending.sort_unstable_by(|a, b| b.cmp(a));
        let mut removed: HashMap<usize, Atom> = descending
            .iter()
            .map(|&i| (i, self.atoms.remove(i)))
            .collect();
        let mut moved: Vec<Atom> = indices
            .iter()
            .filter_map(|i| removed.remove(i))
            .collect();

        if remap {
            let kept_map: HashMap<usize, usize> = (0..len)
                .filter(|i| !seen.contains(i))
                .enumerate()
                .map(|(new, old)| (old, new))
                .collect();
            let moved_map: HashMap<usize, usize> = indices
                .iter()
                .enumerate()
                .map(|(new, &old)| (old, new))
                .collect();
            remap_bonds(&mut self.atoms, &kept_map);
            remap_bonds(&mut moved, &moved_map);
        }

        debug!(
            "Split {} atoms off '{}' into '{}' (bonds remapped: {})",
            moved.len(),
            self.label,
            label,
            remap
        );
        self.refresh();
        Molecule::from_atoms(label, moved, false, offset)
    }

    fn scale_positions(&mut self, factor: f64) -> Result<(), MoleculeError> {
        if !factor.is_finite() || factor == 0.0 {
            return Err(MoleculeError::InvalidScale(factor));
        }
        for atom in &mut self.atoms {
            atom.position = Point3::from(atom.position.coords * factor);
        }
        Ok(())
    }

    fn apply_rotation(&mut self, rotation: &Rotation3<f64>) {
        let pivot = self.center;
        for atom in &mut self.atoms {
            atom.position = geometry::rotate_about(&atom.position, &pivot, rotation);
        }
        self.refresh();
    }

    fn refresh(&mut self) {
        if let Some(center) = geometry::centroid(self.atoms.iter().map(|a| &a.position)) {
            self.center = center;
        }
        self.render();
    }

    /// Rebuilds the primitive list: spheres, then labels, then sticks.
    fn render(&mut self) {
        self.warnings.clear();
        let mut primitives = Vec::with_capacity(self.atoms.len());

        for atom in &self.atoms {
            if !style::is_known_element(&atom.element) {
                self.warnings.insert(atom.element.clone());
            }
            let texture = match &self.style {
                Some(texture) => texture.clone(),
                None => style::atom_texture(&atom.element),
            };
            primitives.push(Primitive::sphere(
                atom.position,
                style::element_radius(&atom.element),
                texture,
            ));
        }

        if let Some(camera) = self.overlays.camera {
            if self.overlays.element_labels {
                primitives.extend(self.labels(LabelKind::Element, &camera));
            }
            if self.overlays.index_labels {
                primitives.extend(self.labels(LabelKind::Index, &camera));
            }
        }

        if let Some(radius) = self.overlays.stick_radius {
            primitives.extend(self.sticks(radius));
        }

        self.primitives = primitives;
        self.report_warnings();
    }

    fn labels<'a>(&'a self, kind: LabelKind, camera: &'a Camera) -> impl Iterator<Item = Primitive> + 'a {
        self.atoms.iter().enumerate().map(move |(i, atom)| {
            let text = match kind {
                LabelKind::Element => atom.element.clone(),
                LabelKind::Index => i.to_string(),
            };
            overlay::atom_label(
                &atom.position,
                style::element_radius(&atom.element),
                &text,
                &camera.location,
            )
        })
    }

    fn sticks(&self, radius: f64) -> Vec<Primitive> {
        let mut sticks = Vec::new();
        for (i, atom) in self.atoms.iter().enumerate() {
            // Bonds are usually listed from both ends; draw each one once.
            for &j in atom.bonds.iter().filter(|&&j| j > i) {
                let Some(other) = self.atoms.get(j) else {
                    debug!(
                        "Skipping bond {} -> {} in '{}': index outside the atom list",
                        i, j, self.label
                    );
                    continue;
                };
                sticks.extend(overlay::bond_sticks(
                    &atom.position,
                    &atom.element,
                    &other.position,
                    &other.element,
                    radius,
                ));
            }
        }
        sticks
    }

    fn report_warnings(&self) {
        if self.warnings.is_empty() {
            return;
        }
        if self.warnings.contains("") {
            warn!("The structure '{}' is missing element symbols", self.label);
        } else {
            let symbols: Vec<&str> = self.warnings.iter().map(String::as_str).collect();
            warn!(
                "The following elements have no style defined: {}",
                symbols.join(", ")
            );
        }
    }
}

fn remap_bonds(atoms: &mut [Atom], map: &HashMap<usize, usize>) {
    for atom in atoms {
        atom.bonds = atom.bonds.iter().filter_map(|b| map.get(b).copied()).collect();
    }
}

impl fmt::Display for Molecule {
    /// Lists every atom with its index, name and coordinates.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(OVERVIEW_RULE_WIDTH);
        writeln!(f, "Overview for the molecule read from {}", self.label)?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Idx\t\tAtom\t\tx\ty\tz")?;
        for (idx, atom) in self.atoms.iter().enumerate() {
            let p = atom.position;
            writeln!(f, "{}:\t\t{}\t\t{:.2}\t{:.2}\t{:.2}", idx, atom.name, p.x, p.y, p.z)?;
        }
        writeln!(f, "{}", rule)?;
        write!(
            f,
            "Molecule is currently centered at [{:.2}, {:.2}, {:.2}]",
            self.center.x, self.center.y, self.center.z
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};
    use std::io::Cursor;

    const TOL: f64 = 1e-9;

    const WATER: &str = "\
ATOM      1  O   HOH A   1       0.000   0.000   0.000  1.00  0.00           O
ATOM      2  H1  HOH A   1       0.957   0.000   0.000  1.00  0.00           H
ATOM      3  H2  HOH A   1      -0.240   0.927   0.000  1.00  0.00           H
CONECT    1    2    3
CONECT    2    1
CONECT    3    1
";

    fn atoms() -> Vec<Atom> {
        let mut a = Atom::new("C1", "C", Point3::new(1.0, 0.0, 0.0));
        let mut b = Atom::new("O1", "O", Point3::new(3.0, 2.0, 0.0));
        let mut c = Atom::new("H1", "H", Point3::new(2.0, -2.0, 4.0));
        let d = Atom::new("N1", "N", Point3::new(-2.0, 4.0, 0.0));
        a.bonds = vec![1, 2];
        b.bonds = vec![0, 3];
        c.bonds = vec![0];
        let mut d = d;
        d.bonds = vec![1];
        vec![a, b, c, d]
    }

    fn molecule(center: bool) -> Molecule {
        Molecule::from_atoms("test", atoms(), center, Vector3::zeros()).unwrap()
    }

    fn fresh_centroid(m: &Molecule) -> Point3<f64> {
        geometry::centroid(m.atoms().iter().map(|a| &a.position)).unwrap()
    }

    fn assert_close(a: &Point3<f64>, b: &Point3<f64>) {
        assert!((a - b).norm() < TOL, "expected {b:?}, got {a:?}");
    }

    fn sphere_count(m: &Molecule) -> usize {
        m.primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Sphere { .. }))
            .count()
    }

    mod construction {
        use super::*;

        #[test]
        fn uncentered_molecule_keeps_positions() {
            let m = molecule(false);
            assert_eq!(m.len(), 4);
            assert_eq!(m.atoms()[0].position, Point3::new(1.0, 0.0, 0.0));
            assert_close(&m.center(), &Point3::new(1.0, 1.0, 1.0));
        }

        #[test]
        fn centered_molecule_has_centroid_at_origin() {
            let m = molecule(true);
            assert_close(&m.center(), &Point3::origin());
            assert_close(&m.atoms()[0].position, &Point3::new(0.0, -1.0, -1.0));
        }

        #[test]
        fn offset_is_applied_before_centering() {
            let m = Molecule::from_atoms("t", atoms(), false, Vector3::new(10.0, 0.0, -1.0)).unwrap();
            assert_close(&m.center(), &Point3::new(11.0, 1.0, 0.0));

            let centered = Molecule::from_atoms("t", atoms(), true, Vector3::new(10.0, 0.0, -1.0)).unwrap();
            assert_close(&centered.center(), &Point3::origin());
        }

        #[test]
        fn empty_atom_list_is_an_error() {
            let err = Molecule::from_atoms("empty", Vec::new(), true, Vector3::zeros()).unwrap_err();
            assert!(matches!(err, MoleculeError::Empty));
        }

        #[test]
        fn one_sphere_per_atom_sized_by_element() {
            let m = molecule(false);
            assert_eq!(m.primitives().len(), 4);
            match &m.primitives()[1] {
                Primitive::Sphere {
                    center,
                    radius,
                    texture,
                } => {
                    assert_eq!(*center, Point3::new(3.0, 2.0, 0.0));
                    assert_eq!(*radius, 1.0);
                    assert_eq!(*texture, style::atom_texture("O"));
                }
                other => panic!("expected sphere, got {other:?}"),
            }
        }

        #[test]
        fn parses_pdb_text() {
            let m = Molecule::from_pdb_reader("water", &mut Cursor::new(WATER), false, Vector3::zeros())
                .unwrap();
            assert_eq!(m.len(), 3);
            assert_eq!(m.atoms()[0].bonds, vec![1, 2]);
            assert_eq!(m.label(), "water");
            assert!(m.warnings().is_empty());
        }

        #[test]
        fn malformed_pdb_is_a_format_error() {
            let bad = "ATOM      1  O   HOH A   1       0.0x0   0.000   0.000  1.00  0.00           O\n";
            let err = Molecule::from_pdb_reader("bad", &mut Cursor::new(bad), false, Vector3::zeros())
                .unwrap_err();
            assert!(matches!(err, MoleculeError::Format(PdbError::Parse { .. })));
        }

        #[test]
        fn pdb_without_atoms_is_empty_error() {
            let err = Molecule::from_pdb_reader("none", &mut Cursor::new("END\n"), true, Vector3::zeros())
                .unwrap_err();
            assert!(matches!(err, MoleculeError::Empty));
        }

        #[test]
        fn from_pdb_uses_path_as_label() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("water.pdb");
            std::fs::write(&path, WATER).unwrap();
            let m = Molecule::from_pdb(&path, true, Vector3::zeros()).unwrap();
            assert_eq!(m.label(), path.display().to_string());
            assert_close(&m.center(), &Point3::origin());
        }
    }

    mod transforms {
        use super::*;

        #[test]
        fn translate_by_shifts_centroid_by_vector() {
            let mut m = molecule(false);
            let before = m.center();
            let delta = Vector3::new(-3.0, 0.5, 7.25);
            m.translate_by(&delta);
            assert_close(&m.center(), &(before + delta));
            assert_close(&m.center(), &fresh_centroid(&m));
        }

        #[test]
        fn translate_to_places_centroid_on_target() {
            let mut m = molecule(false);
            let target = Point3::new(-10.0, 8.0, -5.0);
            m.translate_to(&target);
            assert_close(&m.center(), &target);
            assert_close(&fresh_centroid(&m), &target);
        }

        #[test]
        fn rotate_preserves_centroid_and_distances() {
            let mut m = molecule(false);
            let before = m.center();
            let distances = |m: &Molecule| {
                let a = m.atoms();
                let mut d = Vec::new();
                for i in 0..a.len() {
                    for j in i + 1..a.len() {
                        d.push((a[i].position - a[j].position).norm());
                    }
                }
                d
            };
            let d0 = distances(&m);

            m.rotate(&Vector3::new(1.0, 2.0, -0.5), 1.234).unwrap();

            assert_close(&m.center(), &before);
            assert_close(&fresh_centroid(&m), &before);
            for (a, b) in d0.iter().zip(distances(&m)) {
                assert!((a - b).abs() < TOL);
            }
        }

        #[test]
        fn rotate_about_centroid_moves_atoms() {
            let mut m = Molecule::from_atoms(
                "pair",
                vec![
                    Atom::new("A", "C", Point3::new(1.0, 0.0, 0.0)),
                    Atom::new("B", "C", Point3::new(3.0, 0.0, 0.0)),
                ],
                false,
                Vector3::zeros(),
            )
            .unwrap();
            m.rotate(&Vector3::z(), FRAC_PI_2).unwrap();
            assert_close(&m.atoms()[0].position, &Point3::new(2.0, -1.0, 0.0));
            assert_close(&m.atoms()[1].position, &Point3::new(2.0, 1.0, 0.0));
        }

        #[test]
        fn rotate_rejects_zero_axis_without_changes() {
            let mut m = molecule(false);
            let before = m.atoms().to_vec();
            let err = m.rotate(&Vector3::zeros(), 1.0).unwrap_err();
            assert!(matches!(err, MoleculeError::DegenerateAxis));
            assert_eq!(m.atoms(), &before[..]);
        }

        #[test]
        fn rotation_for_step_is_reproducible_from_baseline() {
            let baseline = molecule(true);
            let axis = Vector3::new(1.0, 0.0, 0.0);
            let theta = PI / 10.0;

            let mut late_first = baseline.clone();
            late_first.rotate_absolute_for_step(&axis, theta, Step::Frame(7)).unwrap();
            let mut early = baseline.clone();
            early.rotate_absolute_for_step(&axis, theta, Step::Frame(2)).unwrap();
            let mut late_again = baseline.clone();
            late_again.rotate_absolute_for_step(&axis, theta, Step::Frame(7)).unwrap();

            for (a, b) in late_first.atoms().iter().zip(late_again.atoms()) {
                assert_close(&a.position, &b.position);
            }

            let mut direct = baseline.clone();
            direct.rotate(&axis, theta * 8.0).unwrap();
            for (a, b) in late_first.atoms().iter().zip(direct.atoms()) {
                assert_close(&a.position, &b.position);
            }
            assert_close(&late_first.center(), &baseline.center());
        }

        #[test]
        fn rotation_for_time_step_uses_frame_time() {
            let baseline = molecule(false);
            let axis = Vector3::y();
            let mut by_time = baseline.clone();
            by_time
                .rotate_absolute_for_step(
                    &axis,
                    0.1,
                    Step::Time {
                        seconds: 0.5,
                        frame_time: 0.25,
                    },
                )
                .unwrap();
            let mut by_frame = baseline.clone();
            by_frame.rotate_absolute_for_step(&axis, 0.1, Step::Frame(2)).unwrap();
            for (a, b) in by_time.atoms().iter().zip(by_frame.atoms()) {
                assert_close(&a.position, &b.position);
            }
        }

        #[test]
        fn invalid_time_step_is_rejected() {
            let bad = Step::Time {
                seconds: 1.0,
                frame_time: 0.0,
            };
            assert!(matches!(bad.index(), Err(MoleculeError::InvalidStep { .. })));
            let negative = Step::Time {
                seconds: -1.0,
                frame_time: 0.5,
            };
            assert!(negative.index().is_err());
            assert_eq!(
                Step::Time {
                    seconds: 2.0,
                    frame_time: 0.5
                }
                .index()
                .unwrap(),
                4
            );
        }

        #[test]
        fn scale_then_inverse_scale_restores_positions() {
            let mut m = molecule(false);
            let before = m.atoms().to_vec();
            m.scale_distances(1.75).unwrap();
            assert_close(&m.atoms()[1].position, &Point3::new(5.25, 3.5, 0.0));
            assert_close(&m.center(), &fresh_centroid(&m));
            m.scale_distances(1.0 / 1.75).unwrap();
            for (a, b) in m.atoms().iter().zip(&before) {
                assert_close(&a.position, &b.position);
            }
        }

        #[test]
        fn scale_is_about_origin_not_centroid() {
            let mut m = molecule(false);
            m.scale_distances(2.0).unwrap();
            assert_close(&m.center(), &Point3::new(2.0, 2.0, 2.0));
        }

        #[test]
        fn zero_or_nan_scale_is_rejected() {
            let mut m = molecule(false);
            assert!(matches!(m.scale_distances(0.0), Err(MoleculeError::InvalidScale(_))));
            assert!(m.scale_distances(f64::NAN).is_err());
            assert_close(&m.center(), &Point3::new(1.0, 1.0, 1.0));
        }

        #[test]
        fn centroid_cache_tracks_mixed_sequences() {
            let mut m = molecule(true);
            m.translate_by(&Vector3::new(1e3, -2.0, 0.3));
            m.rotate(&Vector3::new(0.0, 1.0, 1.0), 0.4).unwrap();
            m.translate_to(&Point3::new(5.0, 5.0, 5.0));
            m.rotate(&Vector3::x(), -2.0).unwrap();
            m.translate_by(&Vector3::new(-0.1, 0.2, -0.3));
            let fresh = fresh_centroid(&m);
            assert!((m.center() - fresh).norm() <= TOL * fresh.coords.norm().max(1.0));
        }

        #[test]
        fn transforms_rebuild_primitives() {
            let mut m = molecule(false);
            m.translate_by(&Vector3::new(1.0, 0.0, 0.0));
            match &m.primitives()[0] {
                Primitive::Sphere { center, .. } => {
                    assert_close(center, &Point3::new(2.0, 0.0, 0.0))
                }
                other => panic!("expected sphere, got {other:?}"),
            }
        }
    }

    mod divide {
        use super::*;

        fn sorted_positions(atoms: &[Atom]) -> Vec<[f64; 3]> {
            let mut p: Vec<[f64; 3]> = atoms
                .iter()
                .map(|a| [a.position.x, a.position.y, a.position.z])
                .collect();
            p.sort_by(|a, b| a.partial_cmp(b).unwrap());
            p
        }

        #[test]
        fn divide_partitions_atoms() {
            let mut m = molecule(false);
            let original = m.atoms().to_vec();

            let part = m.divide(&[3, 1], "part", Vector3::zeros()).unwrap();

            assert_eq!(part.len(), 2);
            assert_eq!(m.len(), 2);
            assert_eq!(part.atoms()[0].name, "N1");
            assert_eq!(part.atoms()[1].name, "O1");
            assert_eq!(m.atoms()[0].name, "C1");
            assert_eq!(m.atoms()[1].name, "H1");

            let mut union = m.atoms().to_vec();
            union.extend(part.atoms().iter().cloned());
            assert_eq!(sorted_positions(&union), sorted_positions(&original));
        }

        #[test]
        fn divide_refreshes_both_molecules() {
            let mut m = molecule(false);
            let part = m.divide(&[0], "part", Vector3::new(0.0, -4.0, 0.0)).unwrap();

            assert_close(&part.center(), &Point3::new(1.0, -4.0, 0.0));
            assert_close(&m.center(), &fresh_centroid(&m));
            assert_eq!(sphere_count(&m), 3);
            assert_eq!(sphere_count(&part), 1);
            assert_eq!(part.label(), "part");
        }

        #[test]
        fn divide_keeps_stale_bonds() {
            let mut m = molecule(false);
            let part = m.divide(&[1], "part", Vector3::zeros()).unwrap();
            assert_eq!(part.atoms()[0].bonds, vec![0, 3]);
            assert_eq!(m.atoms()[0].bonds, vec![1, 2]);
        }

        #[test]
        fn divide_remapped_rewrites_bonds() {
            let mut m = molecule(false);
            let part = m.divide_remapped(&[1, 3], "part", Vector3::zeros()).unwrap();
            // O1 <-> N1 survives inside the new molecule.
            assert_eq!(part.atoms()[0].bonds, vec![1]);
            assert_eq!(part.atoms()[1].bonds, vec![0]);
            // C1 <-> H1 survives, C1 <-> O1 crossed the split.
            assert_eq!(m.atoms()[0].bonds, vec![1]);
            assert_eq!(m.atoms()[1].bonds, vec![0]);
        }

        #[test]
        fn invalid_indices_leave_molecule_untouched() {
            let mut m = molecule(false);
            assert!(matches!(
                m.divide(&[0, 9], "x", Vector3::zeros()),
                Err(MoleculeError::IndexOutOfRange { index: 9, len: 4 })
            ));
            assert!(matches!(
                m.divide(&[2, 2], "x", Vector3::zeros()),
                Err(MoleculeError::DuplicateIndex(2))
            ));
            assert!(matches!(
                m.divide(&[], "x", Vector3::zeros()),
                Err(MoleculeError::Empty)
            ));
            assert!(matches!(
                m.divide(&[0, 1, 2, 3], "x", Vector3::zeros()),
                Err(MoleculeError::Empty)
            ));
            assert_eq!(m.len(), 4);
        }
    }

    mod rendering {
        use super::*;

        fn camera() -> Camera {
            Camera::new(Point3::new(0.0, 0.0, -30.0), Point3::origin())
        }

        #[test]
        fn unknown_element_uses_fallback_and_warns() {
            let m = Molecule::from_atoms(
                "x",
                vec![
                    Atom::new("C1", "C", Point3::origin()),
                    Atom::new("XE", "Xe", Point3::new(1.0, 0.0, 0.0)),
                ],
                false,
                Vector3::zeros(),
            )
            .unwrap();
            assert_eq!(m.warnings().len(), 1);
            assert!(m.warnings().contains("Xe"));
            match &m.primitives()[1] {
                Primitive::Sphere {
                    radius, texture, ..
                } => {
                    assert_eq!(*radius, style::FALLBACK_RADIUS);
                    assert_eq!(*texture, style::atom_texture("Xe"));
                }
                other => panic!("expected sphere, got {other:?}"),
            }
        }

        #[test]
        fn warnings_are_per_render_cycle() {
            let mut m = Molecule::from_atoms(
                "x",
                vec![Atom::new("Q", "Qq", Point3::origin()), Atom::new("C", "C", Point3::origin())],
                false,
                Vector3::zeros(),
            )
            .unwrap();
            assert_eq!(m.take_warnings().len(), 1);
            assert!(m.warnings().is_empty());

            m.divide(&[0], "q", Vector3::zeros()).unwrap();
            assert!(m.warnings().is_empty());
        }

        #[test]
        fn style_override_applies_to_every_sphere() {
            let mut m = molecule(false);
            let glass = Texture::rgb([0.9, 0.9, 1.0], 0.6, 0.4);
            m.set_style(Some(glass.clone()));
            assert!(m.primitives().iter().all(|p| matches!(
                p,
                Primitive::Sphere { texture, .. } if *texture == glass
            )));
            m.set_style(None);
            assert!(matches!(
                &m.primitives()[0],
                Primitive::Sphere { texture, .. } if *texture == style::atom_texture("C")
            ));
        }

        #[test]
        fn labels_are_appended_after_spheres() {
            let mut m = molecule(false);
            m.label_overlay(&camera(), true);
            assert_eq!(m.primitives().len(), 8);
            assert!(m.primitives()[4..]
                .iter()
                .all(|p| matches!(p, Primitive::Intersection { .. })));

            m.label_overlay(&camera(), false);
            assert_eq!(m.primitives().len(), 12);
        }

        #[test]
        fn index_labels_show_positions_in_list() {
            let mut m = molecule(false);
            m.label_overlay(&camera(), false);
            let texts: Vec<String> = m.primitives()[4..]
                .iter()
                .filter_map(|p| match p {
                    Primitive::Intersection { members, .. } => match &members[1] {
                        Primitive::Text { text, .. } => Some(text.clone()),
                        _ => None,
                    },
                    _ => None,
                })
                .collect();
            assert_eq!(texts, vec!["0", "1", "2", "3"]);
        }

        #[test]
        fn labels_survive_transforms_until_cleared() {
            let mut m = molecule(false);
            m.label_overlay(&camera(), true);
            m.rotate(&Vector3::y(), 0.3).unwrap();
            assert_eq!(m.primitives().len(), 8);
            m.clear_labels();
            assert_eq!(m.primitives().len(), 4);
        }

        #[test]
        fn stick_overlay_scales_then_draws_each_bond_once() {
            let mut m = molecule(false);
            m.stick_overlay(1.5).unwrap();
            // Bonds: 0-1, 0-2, 1-3 => three bonds, two cylinders each.
            let cylinders: Vec<&Primitive> = m
                .primitives()
                .iter()
                .filter(|p| matches!(p, Primitive::Cylinder { .. }))
                .collect();
            assert_eq!(cylinders.len(), 6);
            assert_eq!(sphere_count(&m), 4);
            assert_close(&m.atoms()[0].position, &Point3::new(1.5, 0.0, 0.0));
            match cylinders[0] {
                Primitive::Cylinder {
                    base, cap, radius, ..
                } => {
                    assert_close(base, &Point3::new(1.5, 0.0, 0.0));
                    assert_close(cap, &Point3::new(3.0, 1.5, 0.0));
                    assert!((radius - 0.5).abs() < TOL);
                }
                _ => unreachable!(),
            }
        }

        #[test]
        fn sticks_skip_bonds_outside_the_atom_list() {
            let mut m = molecule(false);
            let _ = m.divide(&[3], "n", Vector3::zeros()).unwrap();
            m.stick_overlay(1.0).unwrap();
            // 0-1 and 0-2 remain drawable; 1-3 points past the end.
            let cylinders = m
                .primitives()
                .iter()
                .filter(|p| matches!(p, Primitive::Cylinder { .. }))
                .count();
            assert_eq!(cylinders, 4);
        }

        #[test]
        fn overview_lists_atoms_and_center() {
            let m = molecule(false);
            let text = m.to_string();
            assert!(text.starts_with("Overview for the molecule read from test\n"));
            assert!(text.contains("1:\t\tO1\t\t3.00\t2.00\t0.00"));
            assert!(text.ends_with("Molecule is currently centered at [1.00, 1.00, 1.00]"));
        }
    }
}
