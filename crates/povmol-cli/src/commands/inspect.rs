use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use nalgebra::Vector3;
use povmol::core::io::pdb::PdbFile;
use povmol::core::io::traits::MolecularFile;
use povmol::core::models::molecule::Molecule;
use povmol::core::render::primitives::{Camera, LightSource};
use povmol::core::render::scene::Scene;
use povmol::engine::error::EngineError;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    let offset = args
        .offset
        .as_deref()
        .map(parser::parse_vector3)
        .transpose()
        .map_err(|e| CliError::Argument(e.to_string()))?
        .unwrap_or_else(Vector3::zeros);

    info!("Reading structure from {:?}", &args.input);
    let (atoms, metadata) =
        PdbFile::read_from_path(&args.input).map_err(|e| CliError::FileParsing {
            path: args.input.clone(),
            source: e.into(),
        })?;
    let molecule = Molecule::from_atoms(
        args.input.display().to_string(),
        atoms,
        !args.no_center,
        offset,
    )
    .map_err(EngineError::from)?;

    println!("{}", molecule);
    println!(
        "{} atoms, {} bonds ({} CONECT records)",
        molecule.len(),
        bond_count(&molecule),
        metadata.conect_records
    );

    for guess in &metadata.element_guesses {
        println!(
            "  line {}: element '{}' guessed from atom name '{}'",
            guess.line, guess.element, guess.atom_name
        );
    }
    if !molecule.warnings().is_empty() {
        let symbols: Vec<&str> = molecule.warnings().iter().map(String::as_str).collect();
        println!("Elements drawn with the fallback style: {}", symbols.join(", "));
    }

    if args.sdl {
        let scene = Scene::new(Camera::default())
            .with_lights([LightSource::default()])
            .with_objects(molecule.primitives().iter().cloned());
        println!();
        print!("{}", scene);
    }
    Ok(())
}

/// Counts each bond once, however many atoms list it.
fn bond_count(molecule: &Molecule) -> usize {
    let mut pairs = std::collections::BTreeSet::new();
    for (i, atom) in molecule.atoms().iter().enumerate() {
        for &j in &atom.bonds {
            pairs.insert((i.min(j), i.max(j)));
        }
    }
    pairs.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use povmol::core::models::atom::Atom;

    #[test]
    fn bonds_listed_from_both_ends_count_once() {
        let mut a = Atom::new("C1", "C", Point3::origin());
        let mut b = Atom::new("C2", "C", Point3::new(1.5, 0.0, 0.0));
        let mut c = Atom::new("O", "O", Point3::new(2.0, 1.0, 0.0));
        a.bonds = vec![1];
        b.bonds = vec![0, 2];
        c.bonds = vec![1];
        let molecule = Molecule::from_atoms("t", vec![a, b, c], false, Vector3::zeros()).unwrap();
        assert_eq!(bond_count(&molecule), 2);
    }

    #[test]
    fn inspect_runs_on_a_pdb_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("water.pdb");
        std::fs::write(
            &path,
            "\
ATOM      1  O   HOH A   1       0.000   0.000   0.000  1.00  0.00           O
ATOM      2  H1  HOH A   1       0.957   0.000   0.000  1.00  0.00           H
CONECT    1    2
",
        )
        .unwrap();

        let args = InspectArgs {
            input: path,
            no_center: false,
            offset: Some("1,2,3".into()),
            sdl: true,
        };
        assert!(run(args).is_ok());
    }

    #[test]
    fn inspect_reports_missing_file_with_path() {
        let args = InspectArgs {
            input: "does/not/exist.pdb".into(),
            no_center: false,
            offset: None,
            sdl: false,
        };
        assert!(matches!(run(args), Err(CliError::FileParsing { .. })));
    }
}
