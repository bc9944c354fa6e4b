//! Reader for the fixed-column Protein Data Bank format.
//!
//! Only coordinate records (`ATOM`, `HETATM`) and connectivity records
//! (`CONECT`) are read; every other record type is skipped. Column ranges are
//! the 0-based, half-open equivalents of the ranges in the wwPDB format guide.

use super::traits::MolecularFile;
use crate::core::models::atom::Atom;
use nalgebra::Point3;
use std::io::{self, BufRead};
use std::ops::Range;
use thiserror::Error;
use tracing::debug;

const ATOM_RECORD: &str = "ATOM";
const HETATM_RECORD: &str = "HETATM";
const CONECT_RECORD: &str = "CONECT";

/// Atom name, including the alternate-location column some tools write into.
const NAME_COLUMNS: Range<usize> = 12..17;
/// Fallback element source for legacy files that stop before the element column.
const LEGACY_ELEMENT_COLUMNS: Range<usize> = 12..16;
const X_COLUMNS: Range<usize> = 30..38;
const Y_COLUMNS: Range<usize> = 38..46;
const Z_COLUMNS: Range<usize> = 46..54;
const ELEMENT_COLUMNS: Range<usize> = 76..78;
/// Serial number of the atom a CONECT record starts from.
const CONECT_SERIAL_COLUMNS: Range<usize> = 6..11;
/// Start of the whitespace-separated bonded serials of a CONECT record.
const CONECT_BONDED_START: usize = 11;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
    #[error("CONECT record on line {line} references atom serial {serial}, which does not exist")]
    UnknownSerial { line: usize, serial: usize },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
}

/// An element symbol that had to be inferred from the atom name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementGuess {
    pub line: usize,
    pub atom_name: String,
    pub element: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdbMetadata {
    /// Coordinate records too short to carry an element column.
    pub element_guesses: Vec<ElementGuess>,
    /// Number of CONECT records applied.
    pub conect_records: usize,
}

fn columns_label(range: &Range<usize>) -> String {
    // The format guide counts columns from 1, inclusive on both ends.
    format!("{}-{}", range.start + 1, range.end)
}

fn slice_and_trim(line: &str, range: Range<usize>) -> &str {
    line.get(range).unwrap_or("").trim()
}

fn parse_coordinate(line: &str, line_num: usize, range: Range<usize>) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, range.clone());
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: columns_label(&range),
            value: value.into(),
        },
    })
}

fn parse_serial(value: &str, line_num: usize, columns: String) -> Result<usize, PdbError> {
    value.parse().map_err(|_| PdbError::Parse {
        line: line_num,
        kind: PdbParseErrorKind::InvalidInt {
            columns,
            value: value.into(),
        },
    })
}

/// Converts a 1-based serial into an index into `atom_count` atoms.
fn serial_to_index(serial: usize, atom_count: usize, line: usize) -> Result<usize, PdbError> {
    match serial.checked_sub(1) {
        Some(index) if index < atom_count => Ok(index),
        _ => Err(PdbError::UnknownSerial { line, serial }),
    }
}

struct PendingConect {
    line: usize,
    origin: usize,
    bonded: Vec<usize>,
}

pub struct PdbFile;

impl PdbFile {
    fn parse_atom(line: &str, line_num: usize, metadata: &mut PdbMetadata) -> Result<Atom, PdbError> {
        let name = slice_and_trim(line, NAME_COLUMNS);
        let x = parse_coordinate(line, line_num, X_COLUMNS)?;
        let y = parse_coordinate(line, line_num, Y_COLUMNS)?;
        let z = parse_coordinate(line, line_num, Z_COLUMNS)?;

        // Files with trailing blanks trimmed may end right after a one-letter
        // element, so only a line that stops before the element column guesses.
        let element = if line.len() <= ELEMENT_COLUMNS.start {
            let guessed = slice_and_trim(line, LEGACY_ELEMENT_COLUMNS);
            debug!(
                "Line {}: chemical element guessed to be '{}' from atom name '{}'",
                line_num, guessed, name
            );
            metadata.element_guesses.push(ElementGuess {
                line: line_num,
                atom_name: name.to_string(),
                element: guessed.to_string(),
            });
            guessed
        } else {
            let end = ELEMENT_COLUMNS.end.min(line.len());
            slice_and_trim(line, ELEMENT_COLUMNS.start..end)
        };

        Ok(Atom::new(name, element, Point3::new(x, y, z)))
    }

    fn parse_conect(line: &str, line_num: usize) -> Result<PendingConect, PdbError> {
        let origin_str = slice_and_trim(line, CONECT_SERIAL_COLUMNS);
        let origin = parse_serial(origin_str, line_num, columns_label(&CONECT_SERIAL_COLUMNS))?;
        let bonded = line
            .get(CONECT_BONDED_START..)
            .unwrap_or("")
            .split_whitespace()
            .map(|s| parse_serial(s, line_num, format!("{}-", CONECT_BONDED_START + 1)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PendingConect {
            line: line_num,
            origin,
            bonded,
        })
    }
}

impl MolecularFile for PdbFile {
    type Metadata = PdbMetadata;
    type Error = PdbError;

    /// Reads coordinate and connectivity records.
    ///
    /// Atom serials are assumed to follow file order (serial `n` is the
    /// `n`-th coordinate record), which is how CONECT serials are turned into
    /// list indices. CONECT records are applied after all coordinates are
    /// read; repeated records for the same atom add to its bond list.
    fn read_from(reader: &mut impl BufRead) -> Result<(Vec<Atom>, Self::Metadata), Self::Error> {
        let mut atoms = Vec::new();
        let mut metadata = PdbMetadata::default();
        let mut pending = Vec::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            if line.starts_with(ATOM_RECORD) || line.starts_with(HETATM_RECORD) {
                atoms.push(Self::parse_atom(&line, line_num, &mut metadata)?);
            } else if line.starts_with(CONECT_RECORD) {
                pending.push(Self::parse_conect(&line, line_num)?);
            }
        }

        for conect in pending {
            let origin = serial_to_index(conect.origin, atoms.len(), conect.line)?;
            for serial in conect.bonded {
                let bonded = serial_to_index(serial, atoms.len(), conect.line)?;
                atoms[origin].add_bond(bonded);
            }
            metadata.conect_records += 1;
        }

        debug!(
            "Parsed {} atoms and {} CONECT records",
            atoms.len(),
            metadata.conect_records
        );
        Ok((atoms, metadata))
    }
}
